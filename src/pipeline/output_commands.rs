//! Rules deciding which collections end up in a pipeline's output file
//!
//! Rules are written as `keep <pattern>` or `drop <pattern>`, where the
//! pattern may use `*` to match any sequence of characters. For a given
//! collection, the last matching rule wins, and collections that no rule
//! matches are kept.

use eyre::{bail, ensure, Result};
use std::fmt;

/// What a rule does with the collections it matches
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Keep,
    Drop,
}

/// One `keep`/`drop` rule
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputCommand {
    action: Action,
    pattern: String,
}
//
impl OutputCommand {
    /// Parse a rule
    pub fn parse(command: &str) -> Result<Self> {
        let mut words = command.split_whitespace();
        let action = match words.next() {
            Some("keep") => Action::Keep,
            Some("drop") => Action::Drop,
            Some(other) => bail!("Unknown output command {other:?} in {command:?}"),
            None => bail!("Empty output command"),
        };
        let Some(pattern) = words.next() else {
            bail!("Output command {command:?} has no collection pattern");
        };
        ensure!(
            words.next().is_none(),
            "Output command {command:?} has trailing words"
        );
        Ok(Self {
            action,
            pattern: pattern.to_owned(),
        })
    }

    /// What this rule does with matching collections
    pub fn action(&self) -> Action {
        self.action
    }

    /// Truth that this rule applies to a collection
    pub fn matches(&self, collection: &str) -> bool {
        glob_match(self.pattern.as_bytes(), collection.as_bytes())
    }
}
//
impl fmt::Display for OutputCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            Action::Keep => "keep",
            Action::Drop => "drop",
        };
        write!(f, "{action} {}", self.pattern)
    }
}

/// Ordered list of output rules
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OutputCommands(Vec<OutputCommand>);
//
impl OutputCommands {
    /// Parse a list of rules
    pub fn parse<S: AsRef<str>>(commands: &[S]) -> Result<Self> {
        commands
            .iter()
            .map(|command| OutputCommand::parse(command.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Truth that a collection is written out
    pub fn keeps(&self, collection: &str) -> bool {
        self.0
            .iter()
            .rev()
            .find(|command| command.matches(collection))
            .map_or(true, |command| command.action() == Action::Keep)
    }
}

/// Match a name against a pattern where `*` stands for any sequence
fn glob_match(pattern: &[u8], name: &[u8]) -> bool {
    let (mut p, mut n) = (0, 0);
    // Position of the last star in the pattern, and of the name at that point
    let mut backtrack = None;
    while n < name.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, n));
            p += 1;
        } else if p < pattern.len() && pattern[p] == name[n] {
            p += 1;
            n += 1;
        } else if let Some((star_p, star_n)) = backtrack {
            // Let the last star swallow one more character
            p = star_p + 1;
            n = star_n + 1;
            backtrack = Some((star_p, star_n + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == b'*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_patterns() {
        assert!(glob_match(b"*", b""));
        assert!(glob_match(b"*", b"PandoraPFOs"));
        assert!(glob_match(b"GammaGamma*", b"GammaGammaCandidates_Pi0_New"));
        assert!(glob_match(b"*_New", b"Pi0s_New"));
        assert!(glob_match(b"*Eta*", b"GammaGammaCandidates_Eta_New"));
        assert!(glob_match(b"Muons", b"Muons"));
        assert!(!glob_match(b"Muons", b"MuonsX"));
        assert!(!glob_match(b"*_New", b"Pi0s_Newer"));
        assert!(glob_match(b"a*b*c", b"aXbYbZc"));
    }

    #[test]
    fn last_matching_rule_wins() {
        let commands = OutputCommands::parse(&[
            "drop *",
            "keep PandoraPFOs",
            "keep GammaGamma*",
            "keep FilteredPhotons",
            "keep *_New",
            "keep MCParticles",
            "drop *_startVertices",
            "drop *Eta*",
        ])
        .unwrap();
        assert!(commands.keeps("PandoraPFOs"));
        assert!(commands.keeps("Pi0s_New"));
        assert!(commands.keeps("GammaGammaCandidates_Pi0_New"));
        assert!(!commands.keeps("GammaGammaCandidates_Eta_New"));
        assert!(!commands.keeps("MCParticles_startVertices"));
        assert!(!commands.keeps("Muons"));
    }

    #[test]
    fn unmatched_collections_are_kept() {
        let commands = OutputCommands::parse(&["drop Muons"]).unwrap();
        assert!(commands.keeps("Higgs"));
        assert!(!commands.keeps("Muons"));
        assert!(OutputCommands::default().keeps("anything"));
    }

    #[test]
    fn malformed_commands_are_rejected() {
        assert!(OutputCommand::parse("").is_err());
        assert!(OutputCommand::parse("keep").is_err());
        assert!(OutputCommand::parse("save Muons").is_err());
        assert!(OutputCommand::parse("keep Muons Z").is_err());
        assert_eq!(OutputCommand::parse("  keep   Z ").unwrap().to_string(), "keep Z");
    }
}
