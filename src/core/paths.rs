use std::path::{Component, Path};

/// Whether `relative` stays inside whatever directory it is joined onto:
/// non-empty, not absolute, and free of `..` components.
pub fn is_contained(relative: &str) -> bool {
    if relative.is_empty() {
        return false;
    }
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_relative_paths_are_contained() {
        assert!(is_contained("icons/icon_16x16.png"));
        assert!(is_contained("1.20.4"));
        assert!(is_contained("./sounds/step.ogg"));
    }

    #[test]
    fn escapes_are_rejected() {
        assert!(!is_contained(""));
        assert!(!is_contained("../../../../etc/evil"));
        assert!(!is_contained("sounds/../../evil"));
        assert!(!is_contained("/abs/evil"));
        assert!(!is_contained(".."));
    }
}
