/// Monotonic handle for one in-flight request (grid, cell details, narrative).
///
/// Later tickets always compare greater, so "is this the newest request"
/// is a single comparison.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(pub u64);

/// Issues tickets and remembers the newest one.
#[derive(Debug, Default)]
pub struct TicketIssuer {
    next: u64,
    latest: Option<RequestTicket>,
}

impl TicketIssuer {
    pub fn issue(&mut self) -> RequestTicket {
        let t = RequestTicket(self.next);
        self.next += 1;
        self.latest = Some(t);
        t
    }

    pub fn latest(&self) -> Option<RequestTicket> {
        self.latest
    }

    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.latest == Some(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestTicket, TicketIssuer};

    #[test]
    fn tickets_increase_and_only_newest_is_latest() {
        let mut issuer = TicketIssuer::default();
        assert_eq!(issuer.latest(), None);
        let a = issuer.issue();
        let b = issuer.issue();
        assert!(b > a);
        assert!(issuer.is_latest(b));
        assert!(!issuer.is_latest(a));
        assert_eq!(a, RequestTicket(0));
    }
}
