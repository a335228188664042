//! Built-in sequence catalog
//!
//! Static phase tables keyed by combat style name.

use std::sync::Arc;
use std::time::Duration;

use clonewatch_types::CombatStyle;
use hashbrown::HashMap;
use phf::phf_map;

use super::{Phase, Sequence, SequenceError};

/// Compile-time phase definition
#[derive(Debug, Clone, Copy)]
pub struct PhaseDef {
    pub icons: &'static [&'static str],
    pub duration_ms: u64,
}

impl PhaseDef {
    const fn new(icons: &'static [&'static str], duration_ms: u64) -> Self {
        Self { icons, duration_ms }
    }

    fn to_phase(self) -> Phase {
        Phase::new(self.icons.iter().copied(), Duration::from_millis(self.duration_ms))
    }
}

const MAGIC_PHASES: &[PhaseDef] = &[
    PhaseDef::new(&["magic"], 5400),
    PhaseDef::new(&["omni"], 1800),
    PhaseDef::new(&["nami"], 1800),
];

const NECRO_PHASES: &[PhaseDef] = &[
    PhaseDef::new(&["invoke"], 1800),
    PhaseDef::new(&["threads"], 1800),
    PhaseDef::new(&["bloat"], 1800),
    PhaseDef::new(&["volley"], 1800),
    PhaseDef::new(&["t90", "eof"], 1800),
];

/// Phase tables by combat style key
pub static BUILTIN_SEQUENCES: phf::Map<&'static str, &'static [PhaseDef]> = phf_map! {
    "magic" => MAGIC_PHASES,
    "necro" => NECRO_PHASES,
};

/// Validated sequences, one per combat style
#[derive(Debug, Clone, Default)]
pub struct SequenceCatalog {
    sequences: HashMap<CombatStyle, Arc<Sequence>>,
}

impl SequenceCatalog {
    /// Build the catalog from the static tables
    pub fn builtin() -> Result<Self, SequenceError> {
        let mut catalog = Self::default();
        for style in CombatStyle::ALL {
            let defs = BUILTIN_SEQUENCES.get(style.key()).copied().unwrap_or(&[]);
            let phases = defs.iter().map(|d| d.to_phase()).collect();
            catalog.insert(style, Sequence::new(style.key(), phases)?);
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, style: CombatStyle, sequence: Sequence) {
        self.sequences.insert(style, Arc::new(sequence));
    }

    pub fn get(&self, style: CombatStyle) -> Option<Arc<Sequence>> {
        self.sequences.get(&style).cloned()
    }

    /// Every icon id referenced by any sequence, sorted and deduplicated
    pub fn icon_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sequences
            .values()
            .flat_map(|s| s.phases().iter().flat_map(|p| p.icon_ids.iter().cloned()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Styles with a sequence, in declaration order
    pub fn styles(&self) -> impl Iterator<Item = (CombatStyle, &Arc<Sequence>)> {
        CombatStyle::ALL
            .into_iter()
            .filter_map(|style| self.sequences.get(&style).map(|seq| (style, seq)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = SequenceCatalog::builtin().unwrap();

        let magic = catalog.get(CombatStyle::Magic).unwrap();
        assert_eq!(magic.len(), 3);
        assert_eq!(magic.first().duration, Duration::from_millis(5400));
        assert_eq!(magic.total_duration(), Duration::from_millis(9000));

        let necro = catalog.get(CombatStyle::Necro).unwrap();
        assert_eq!(necro.len(), 5);
        assert_eq!(necro.last().icon_ids, vec!["t90", "eof"]);
    }

    #[test]
    fn test_icon_ids_are_unique() {
        let catalog = SequenceCatalog::builtin().unwrap();
        let ids = catalog.icon_ids();
        assert_eq!(ids.len(), 9);
        assert!(ids.contains(&"eof".to_string()));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
