//! Decoded view of one owner's rules.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use gambit_core::rule::RuleKey;
use gambit_core::{OwnerKind, RuleCatalog, RuleDefinition};

use super::load_rule_rows;

/// Owner kinds accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Creature,
    GameObject,
    AreaTrigger,
    Quest,
    Instance,
    TimedActionList,
    Scene,
    AreaTriggerEntity,
}

impl From<Kind> for OwnerKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Creature => OwnerKind::Creature,
            Kind::GameObject => OwnerKind::GameObject,
            Kind::AreaTrigger => OwnerKind::AreaTrigger,
            Kind::Quest => OwnerKind::Quest,
            Kind::Instance => OwnerKind::Instance,
            Kind::TimedActionList => OwnerKind::TimedActionList,
            Kind::Scene => OwnerKind::Scene,
            Kind::AreaTriggerEntity => OwnerKind::AreaTriggerEntity,
        }
    }
}

#[derive(Debug, Parser)]
pub struct Inspect {
    /// Rule rows (JSON array)
    #[arg(long)]
    rules: PathBuf,

    /// Owner category
    #[arg(long, value_enum)]
    owner_kind: Kind,

    /// Template id, or negated spawn id
    #[arg(long, allow_hyphen_values = true)]
    owner_key: i64,
}

impl Inspect {
    pub fn execute(&self) -> Result<()> {
        let rows = load_rule_rows(&self.rules)?;
        let key = RuleKey::new(self.owner_kind.into(), self.owner_key);

        // Decode only; static references are not checked here.
        let definitions: Vec<RuleDefinition> = rows
            .iter()
            .filter(|row| row.owner_kind == key.kind.code() && row.owner_key == key.owner_key)
            .filter_map(|row| match row.decode() {
                Ok(decoded) => Some(decoded.definition),
                Err(err) => {
                    println!("  undecodable row {}: {err}", row.row_key());
                    None
                }
            })
            .collect();
        let catalog = RuleCatalog::from_definitions(definitions);
        let rules = catalog.rules(key);

        println!("{key}: {} rules", rules.len());
        for rule in rules {
            print_rule(rule);
        }
        Ok(())
    }
}

fn print_rule(rule: &RuleDefinition) {
    print!("  #{:<4} {:<22}", rule.event_id, rule.event.kind().to_string());
    if rule.link != 0 {
        print!(" -> #{}", rule.link);
    }
    println!();
    println!("        action: {}", rule.action);
    println!("        target: {}", rule.target);
    if rule.phase_mask.bits() != 0 {
        println!("        phases: {:#06x}", rule.phase_mask.bits());
    }
    if rule.chance < 100 {
        println!("        chance: {}%", rule.chance);
    }
    if !rule.flags.is_empty() {
        println!("        flags:  {:?}", rule.flags);
    }
    if !rule.comment.is_empty() {
        println!("        \"{}\"", rule.comment);
    }
}
