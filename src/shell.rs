//! Navigation between the auth screen and the entity views.

use crate::entity::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth(AuthMode),
    Entity(EntityKind),
}

/// The screen to show for the given state.
pub fn screen(authenticated: bool, selected: EntityKind, mode: AuthMode) -> Screen {
    if authenticated {
        Screen::Entity(selected)
    } else {
        Screen::Auth(mode)
    }
}

/// Selected entity kind plus the mount counter.
///
/// Every mount gets a new id, so replies addressed to a previous mount of the
/// same kind are recognizably stale.
#[derive(Debug)]
pub struct Shell {
    selected: EntityKind,
    next_mount: u64,
}

impl Shell {
    pub fn new(selected: EntityKind) -> Self {
        Self {
            selected,
            next_mount: 1,
        }
    }

    pub fn selected(&self) -> EntityKind {
        self.selected
    }

    /// Switch to `kind`. Returns the new mount id, or `None` if `kind` is
    /// already selected and `mounted` is true.
    pub fn select(&mut self, kind: EntityKind, mounted: bool) -> Option<u64> {
        if kind == self.selected && mounted {
            return None;
        }
        self.selected = kind;
        Some(self.remount())
    }

    /// Allocate a fresh mount id for the selected kind.
    pub fn remount(&mut self) -> u64 {
        let id = self.next_mount;
        self.next_mount = self.next_mount.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_depends_on_auth() {
        assert_eq!(
            screen(false, EntityKind::Posts, AuthMode::Register),
            Screen::Auth(AuthMode::Register)
        );
        assert_eq!(
            screen(true, EntityKind::Users, AuthMode::Register),
            Screen::Entity(EntityKind::Users)
        );
    }

    #[test]
    fn test_select_same_kind_is_noop() {
        let mut shell = Shell::new(EntityKind::Posts);
        assert_eq!(shell.select(EntityKind::Posts, true), None);
        let first = shell.select(EntityKind::Albums, true).unwrap();
        let second = shell.select(EntityKind::Posts, true).unwrap();
        assert!(second > first);
        assert_eq!(shell.selected(), EntityKind::Posts);
    }

    #[test]
    fn test_select_mounts_when_nothing_mounted() {
        let mut shell = Shell::new(EntityKind::Posts);
        assert!(shell.select(EntityKind::Posts, false).is_some());
    }

    #[test]
    fn test_auth_mode_toggle() {
        assert_eq!(AuthMode::Login.toggled(), AuthMode::Register);
        assert_eq!(AuthMode::Register.toggled(), AuthMode::Login);
    }
}
