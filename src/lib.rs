pub mod cli;
pub mod core;
pub mod engine;
pub mod services;

// よく使う型をクレートルートから参照できるようにする
pub use crate::core::{
    Order, OrderFactory, PipelineConfig, PipelineError, PipelineReporter, PipelineResult,
    PipelineSummary, PizzaKind, Stage,
};
pub use crate::engine::{
    create_default_pipeline_engine, create_pipeline_engine, create_quiet_pipeline_engine,
    run_until_ctrl_c, PipelineEngine, ShutdownHandle,
};
pub use crate::services::{
    DefaultPipelineConfig, NoOpPipelineReporter, RandomOrderFactory, RecordingPipelineReporter,
    ScriptedOrderFactory, TracingPipelineReporter,
};
