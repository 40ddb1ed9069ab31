use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Identifies one panel instance within a [`PointerListeners`] registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Drag,
    Resize,
}

#[derive(Debug, Default)]
struct Registry {
    next_panel: u64,
    attached: BTreeMap<PanelId, ListenerKind>,
}

/// Process-wide pointer move/up subscriptions.
///
/// The only state shared between panels. Attachments are held by
/// [`ListenerGuard`]s and released when the guard drops, so a panel torn down
/// mid-gesture cannot leave a subscription behind.
#[derive(Debug, Clone, Default)]
pub struct PointerListeners {
    inner: Rc<RefCell<Registry>>,
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_panel(&self) -> PanelId {
        let mut reg = self.inner.borrow_mut();
        let id = PanelId(reg.next_panel);
        reg.next_panel += 1;
        id
    }

    /// Attach move/up listeners for `panel`; a panel holds at most one.
    pub fn attach(&self, panel: PanelId, kind: ListenerKind) -> ListenerGuard {
        self.inner.borrow_mut().attached.insert(panel, kind);
        ListenerGuard {
            registry: Rc::clone(&self.inner),
            panel,
        }
    }

    pub fn attached(&self, panel: PanelId) -> Option<ListenerKind> {
        self.inner.borrow().attached.get(&panel).copied()
    }

    pub fn active_count(&self) -> usize {
        self.inner.borrow().attached.len()
    }

    /// Panels currently receiving pointer events, in registration order.
    pub fn active(&self) -> Vec<(PanelId, ListenerKind)> {
        self.inner
            .borrow()
            .attached
            .iter()
            .map(|(id, kind)| (*id, *kind))
            .collect()
    }
}

/// Live attachment; detaches on drop.
#[derive(Debug)]
pub struct ListenerGuard {
    registry: Rc<RefCell<Registry>>,
    panel: PanelId,
}

impl ListenerGuard {
    pub fn panel(&self) -> PanelId {
        self.panel
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.registry.borrow_mut().attached.remove(&self.panel);
    }
}

#[cfg(test)]
mod tests {
    use super::{ListenerKind, PointerListeners};

    #[test]
    fn guard_detaches_on_drop() {
        let listeners = PointerListeners::new();
        let a = listeners.register_panel();
        let b = listeners.register_panel();
        assert_ne!(a, b);

        let guard = listeners.attach(a, ListenerKind::Drag);
        assert_eq!(listeners.attached(a), Some(ListenerKind::Drag));
        assert_eq!(listeners.attached(b), None);
        assert_eq!(guard.panel(), a);

        drop(guard);
        assert_eq!(listeners.active_count(), 0);
    }

    #[test]
    fn clones_share_one_registry() {
        let listeners = PointerListeners::new();
        let other = listeners.clone();
        let id = other.register_panel();
        let _guard = other.attach(id, ListenerKind::Resize);
        assert_eq!(listeners.active(), vec![(id, ListenerKind::Resize)]);
    }
}
