//! Code Block (spec.md §3, §4.4): opaque author-written source text plus the
//! bookkeeping needed to merge repeated declarations of the same kind.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodeBlockKind {
    Predictor,
    Integrator,
    ComputeStress,
    ComputeFinalStress,
    TangentOperator,
    PredictionOperator,
    InitLocalVariables,
    UpdateAuxiliaryStateVariables,
    InternalEnergy,
    DissipatedEnergy,
    SpeedOfSound,
    ComputeStressFreeExpansion,
    APrioriTimeStepScalingFactor,
    APosterioriTimeStepScalingFactor,
    AdditionalConvergenceChecks,
    ProcessNewCorrection,
    RejectCurrentCorrection,
    ProcessNewEstimate,
    /// `@Initialize <Id>` — the id distinguishes sibling initialise blocks.
    Initialize(String),
    /// `@PostProcessing <Id>`.
    PostProcessing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPolicy {
    Create,
    CreateOrAppend,
    CreateOrReplace,
    CreateButDontReplace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Body,
    AtBeginning,
    AtEnd,
}

#[derive(Debug, Clone)]
pub struct CodeBlock {
    pub source: String,
    pub referenced_members: HashSet<String>,
    pub referenced_static_members: HashSet<String>,
    pub attributes: std::collections::HashMap<String, String>,
    pub description: String,
    pub line: u32,
}

impl CodeBlock {
    pub fn new(source: impl Into<String>, line: u32) -> Self {
        Self {
            source: source.into(),
            referenced_members: HashSet::new(),
            referenced_static_members: HashSet::new(),
            attributes: std::collections::HashMap::new(),
            description: String::new(),
            line,
        }
    }

    /// Appends another block's text at the requested position, merging the
    /// reference sets (spec.md §4.4, "Code-block mutation").
    fn merge_at(&mut self, other: &CodeBlock, position: Position) {
        match position {
            Position::AtEnd | Position::Body => {
                self.source.push('\n');
                self.source.push_str(&other.source);
            }
            Position::AtBeginning => {
                let mut combined = other.source.clone();
                combined.push('\n');
                combined.push_str(&self.source);
                self.source = combined;
            }
        }
        self.referenced_members.extend(other.referenced_members.iter().cloned());
        self.referenced_static_members.extend(other.referenced_static_members.iter().cloned());
    }
}

/// Holds at most one [`CodeBlock`] per kind and applies the insertion
/// policy on repeated declarations.
#[derive(Debug, Clone, Default)]
pub struct CodeBlocks {
    blocks: std::collections::HashMap<CodeBlockKind, CodeBlock>,
}

impl CodeBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: &CodeBlockKind) -> Option<&CodeBlock> {
        self.blocks.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &CodeBlockKind> {
        self.blocks.keys()
    }

    /// Applies `policy` when inserting `block` under `kind`, per spec.md
    /// §4.4's `{CREATE, CREATEORAPPEND, CREATEORREPLACE, CREATEBUTDONTREPLACE}
    /// x {BODY, AT_BEGINNING, AT_END}` matrix.
    pub fn insert(
        &mut self,
        kind: CodeBlockKind,
        block: CodeBlock,
        policy: InsertPolicy,
        position: Position,
    ) -> crate::error::Result<()> {
        use crate::error::{ErrorKind, MFrontError};
        use crate::token::Span;

        match (self.blocks.get_mut(&kind), policy) {
            (None, _) => {
                self.blocks.insert(kind, block);
                Ok(())
            }
            (Some(_), InsertPolicy::Create) => Err(MFrontError::new(
                ErrorKind::DuplicateDeclaration { name: format!("{kind:?}") },
                Span::new(block.line as usize, block.line as usize, block.line),
                "code-block",
            )),
            (Some(existing), InsertPolicy::CreateOrAppend) => {
                existing.merge_at(&block, position);
                Ok(())
            }
            (Some(existing), InsertPolicy::CreateOrReplace) => {
                *existing = block;
                Ok(())
            }
            (Some(_), InsertPolicy::CreateButDontReplace) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_always_creates() {
        let mut blocks = CodeBlocks::new();
        blocks
            .insert(CodeBlockKind::Integrator, CodeBlock::new("a", 1), InsertPolicy::Create, Position::Body)
            .unwrap();
        assert_eq!(blocks.get(&CodeBlockKind::Integrator).unwrap().source, "a");
    }

    #[test]
    fn create_policy_rejects_duplicate() {
        let mut blocks = CodeBlocks::new();
        blocks
            .insert(CodeBlockKind::Integrator, CodeBlock::new("a", 1), InsertPolicy::Create, Position::Body)
            .unwrap();
        let err = blocks
            .insert(CodeBlockKind::Integrator, CodeBlock::new("b", 2), InsertPolicy::Create, Position::Body)
            .unwrap_err();
        assert!(matches!(err.kind, crate::error::ErrorKind::DuplicateDeclaration { .. }));
    }

    #[test]
    fn create_or_append_appends_at_end() {
        let mut blocks = CodeBlocks::new();
        blocks
            .insert(CodeBlockKind::Integrator, CodeBlock::new("a", 1), InsertPolicy::Create, Position::Body)
            .unwrap();
        blocks
            .insert(CodeBlockKind::Integrator, CodeBlock::new("b", 2), InsertPolicy::CreateOrAppend, Position::AtEnd)
            .unwrap();
        assert_eq!(blocks.get(&CodeBlockKind::Integrator).unwrap().source, "a\nb");
    }

    #[test]
    fn create_or_append_prepends_at_beginning() {
        let mut blocks = CodeBlocks::new();
        blocks
            .insert(CodeBlockKind::Integrator, CodeBlock::new("a", 1), InsertPolicy::Create, Position::Body)
            .unwrap();
        blocks
            .insert(
                CodeBlockKind::Integrator,
                CodeBlock::new("b", 2),
                InsertPolicy::CreateOrAppend,
                Position::AtBeginning,
            )
            .unwrap();
        assert_eq!(blocks.get(&CodeBlockKind::Integrator).unwrap().source, "b\na");
    }

    #[test]
    fn create_or_replace_discards_previous_text() {
        let mut blocks = CodeBlocks::new();
        blocks
            .insert(CodeBlockKind::Integrator, CodeBlock::new("a", 1), InsertPolicy::Create, Position::Body)
            .unwrap();
        blocks
            .insert(CodeBlockKind::Integrator, CodeBlock::new("b", 2), InsertPolicy::CreateOrReplace, Position::Body)
            .unwrap();
        assert_eq!(blocks.get(&CodeBlockKind::Integrator).unwrap().source, "b");
    }

    #[test]
    fn create_but_dont_replace_keeps_first() {
        let mut blocks = CodeBlocks::new();
        blocks
            .insert(CodeBlockKind::Integrator, CodeBlock::new("a", 1), InsertPolicy::Create, Position::Body)
            .unwrap();
        blocks
            .insert(
                CodeBlockKind::Integrator,
                CodeBlock::new("b", 2),
                InsertPolicy::CreateButDontReplace,
                Position::Body,
            )
            .unwrap();
        assert_eq!(blocks.get(&CodeBlockKind::Integrator).unwrap().source, "a");
    }

    #[test]
    fn distinct_initialize_ids_are_distinct_kinds() {
        let mut blocks = CodeBlocks::new();
        blocks
            .insert(
                CodeBlockKind::Initialize("A".into()),
                CodeBlock::new("a", 1),
                InsertPolicy::Create,
                Position::Body,
            )
            .unwrap();
        blocks
            .insert(
                CodeBlockKind::Initialize("B".into()),
                CodeBlock::new("b", 2),
                InsertPolicy::Create,
                Position::Body,
            )
            .unwrap();
        assert_eq!(blocks.get(&CodeBlockKind::Initialize("A".into())).unwrap().source, "a");
        assert_eq!(blocks.get(&CodeBlockKind::Initialize("B".into())).unwrap().source, "b");
    }
}
