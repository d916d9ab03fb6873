use std::sync::Arc;

/// When the planner re-fetches after user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// One refresh per successful create, update or delete.
    #[default]
    OnMutation,
    /// Also refresh whenever the edit modal opens or closes, so an update
    /// or delete refreshes three times counting the open.
    EveryInteraction,
}

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshCause {
    Created,
    Updated,
    Deleted,
    ModalOpened,
    ModalClosed,
    /// Requested by the host (e.g., a "reload" button)
    Manual,
}

impl RefreshCause {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            RefreshCause::Created | RefreshCause::Updated | RefreshCause::Deleted
        )
    }
}

/// Delivered to observers each time the planner's data is invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshEvent {
    /// Increases by one per delivered refresh
    pub generation: u64,
    pub cause: RefreshCause,
}

/// Something outside the rule list that must follow rule changes
/// (the projection panel, a transactions panel, a cache).
pub trait RefreshObserver: Send + Sync {
    fn on_refresh(&self, event: &RefreshEvent);
}

/// Decides whether an interaction invalidates the planner's data and fans
/// the invalidation out to every observer.
pub struct RefreshCoordinator {
    policy: RefreshPolicy,
    generation: u64,
    observers: Vec<Arc<dyn RefreshObserver>>,
}

impl RefreshCoordinator {
    pub fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            generation: 0,
            observers: Vec::new(),
        }
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: RefreshPolicy) {
        self.policy = policy;
    }

    /// Number of refreshes delivered so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn subscribe(&mut self, observer: Arc<dyn RefreshObserver>) {
        self.observers.push(observer);
    }

    pub fn should_refresh(&self, cause: RefreshCause) -> bool {
        match self.policy {
            RefreshPolicy::OnMutation => {
                cause.is_mutation() || cause == RefreshCause::Manual
            }
            RefreshPolicy::EveryInteraction => true,
        }
    }

    /// Record a refresh for `cause` and notify observers.
    /// Returns `None` when the policy says `cause` does not invalidate anything.
    pub fn trigger(&mut self, cause: RefreshCause) -> Option<RefreshEvent> {
        if !self.should_refresh(cause) {
            return None;
        }
        self.generation += 1;
        let event = RefreshEvent {
            generation: self.generation,
            cause,
        };
        tracing::debug!(generation = event.generation, ?cause, "refresh triggered");
        for observer in &self.observers {
            observer.on_refresh(&event);
        }
        Some(event)
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new(RefreshPolicy::default())
    }
}
