// Application layer - Use case interactors

pub mod assembler;
pub mod conformer;
pub mod container;
pub mod pool_builder;
pub mod recompose_interactor;
pub mod segmenter;
pub mod variant_driver;

// Re-export interactors
pub use assembler::TimelineAssembler;
pub use conformer::SegmentConformer;
pub use pool_builder::PoolBuilder;
pub use recompose_interactor::{
    CueSource, PlanSummary, RecomposeInteractor, RecomposePlan, RecomposeRequest, RunReport,
    VariantStatus,
};
pub use segmenter::Segmenter;
pub use variant_driver::{BaseCut, VariantDriver, VariantOutcome};
