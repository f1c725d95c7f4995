use crate::skills::SkillId;
use std::collections::BTreeMap;

/// The set of skills visible during the current agent turn, keyed by
/// the short name they are mounted under. Owned by the turn context;
/// `reset` runs exactly once when the turn ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSkills {
    entries: BTreeMap<String, SkillId>,
}

impl LoadedSkills {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent for an already-loaded identifier. Loading a different
    /// identifier that shares a short name replaces the binding.
    pub fn load(&mut self, id: SkillId) {
        self.entries.insert(id.short_name().to_string(), id);
    }

    pub fn loaded(&self, short_name: &str) -> Option<&SkillId> {
        self.entries.get(short_name)
    }

    pub fn list_loaded(&self) -> Vec<&SkillId> {
        self.entries.values().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(raw: &str) -> SkillId {
        SkillId::parse(raw).expect("skill id")
    }

    #[test]
    fn load_is_idempotent() {
        let mut gate = LoadedSkills::new();
        gate.load(skill("escrituras/compraventa"));
        gate.load(skill("escrituras/compraventa"));

        assert_eq!(gate.list_loaded().len(), 1);
        assert_eq!(
            gate.loaded("compraventa"),
            Some(&skill("escrituras/compraventa"))
        );
    }

    #[test]
    fn same_short_name_latest_load_wins() {
        let mut gate = LoadedSkills::new();
        gate.load(skill("escrituras/compraventa"));
        gate.load(skill("plantillas/compraventa"));

        assert_eq!(gate.list_loaded().len(), 1);
        assert_eq!(
            gate.loaded("compraventa"),
            Some(&skill("plantillas/compraventa"))
        );
    }

    #[test]
    fn reset_returns_to_empty() {
        let mut gate = LoadedSkills::new();
        gate.load(skill("escrituras/compraventa"));
        gate.load(skill("contratos/arrendamiento"));
        assert!(!gate.is_empty());

        gate.reset();

        assert!(gate.is_empty());
        assert_eq!(gate.loaded("compraventa"), None);
    }
}
