use aide_llm::ChatMessage;
use aide_persist::Thread;

use crate::assistant::Assistant;

/// The acting party for permission checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub is_superuser: bool,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_superuser: false,
        }
    }

    pub fn superuser(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_superuser: true,
        }
    }
}

/// Pluggable predicates gating every facade operation.
///
/// Each predicate receives the acting party plus the relevant entity and is
/// consulted before any mutation or sensitive read; a `false` means the
/// facade raises a "not allowed" error with no partial side effect. All
/// predicates default to allow.
pub trait PermissionPolicy: Send + Sync {
    fn can_create_thread(&self, _user: Option<&User>) -> bool {
        true
    }

    fn can_view_thread(&self, _user: Option<&User>, _thread: &Thread) -> bool {
        true
    }

    fn can_update_thread(&self, _user: Option<&User>, _thread: &Thread) -> bool {
        true
    }

    fn can_delete_thread(&self, _user: Option<&User>, _thread: &Thread) -> bool {
        true
    }

    fn can_create_message(&self, _user: Option<&User>, _thread: &Thread) -> bool {
        true
    }

    fn can_update_message(
        &self,
        _user: Option<&User>,
        _thread: &Thread,
        _message: &ChatMessage,
    ) -> bool {
        true
    }

    fn can_delete_message(
        &self,
        _user: Option<&User>,
        _thread: &Thread,
        _message: &ChatMessage,
    ) -> bool {
        true
    }

    fn can_run_assistant(&self, _user: Option<&User>, _assistant: &dyn Assistant) -> bool {
        true
    }
}

/// Every operation allowed, for anyone
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionPolicy for AllowAll {}

/// Thread and message operations restricted to the thread owner or a
/// superuser; thread creation requires an authenticated user.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerOrSuperuser;

fn owns_thread(user: Option<&User>, thread: &Thread) -> bool {
    match user {
        Some(user) => {
            user.is_superuser || thread.created_by.as_deref() == Some(user.id.as_str())
        }
        None => false,
    }
}

impl PermissionPolicy for OwnerOrSuperuser {
    fn can_create_thread(&self, user: Option<&User>) -> bool {
        user.is_some()
    }

    fn can_view_thread(&self, user: Option<&User>, thread: &Thread) -> bool {
        owns_thread(user, thread)
    }

    fn can_update_thread(&self, user: Option<&User>, thread: &Thread) -> bool {
        owns_thread(user, thread)
    }

    fn can_delete_thread(&self, user: Option<&User>, thread: &Thread) -> bool {
        owns_thread(user, thread)
    }

    fn can_create_message(&self, user: Option<&User>, thread: &Thread) -> bool {
        owns_thread(user, thread)
    }

    fn can_update_message(
        &self,
        user: Option<&User>,
        thread: &Thread,
        _message: &ChatMessage,
    ) -> bool {
        owns_thread(user, thread)
    }

    fn can_delete_message(
        &self,
        user: Option<&User>,
        thread: &Thread,
        _message: &ChatMessage,
    ) -> bool {
        owns_thread(user, thread)
    }
}
