//! contralyst-heuristics: Regex heuristics for royalty terms.
//!
//! One implementation shared by the relay's fallback path and by anything
//! that needs offline term candidates:
//!   - `synthesizer`: fabricates an Extraction Result from raw contract text
//!   - `category`: the fixed set of term categories and their patterns
//!   - `highlighter`: tags category matches in the text as Extracted Terms
//!   - `mapping`: locates relay result values back in the source text
//!   - `workflow`: the scan → analyze → map → complete pipeline

pub mod category;
pub mod confidence;
pub mod highlighter;
pub mod mapping;
pub mod synthesizer;
pub mod workflow;

pub use category::Category;
pub use highlighter::{highlight, highlight_all, ExtractedTerm, TermSet};
pub use synthesizer::synthesize;
pub use workflow::{
    ExtractionSource, ExtractionWorkflow, RunReport, SourcedExtraction, WorkflowError,
    WorkflowEvent, WorkflowState, WorkflowTimings,
};
