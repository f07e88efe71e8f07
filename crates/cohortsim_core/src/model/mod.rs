mod matrix;
mod parameters;
mod results;
mod states;
mod trace;

pub use matrix::{ROW_SUM_TOLERANCE, TransitionMatrix};
pub use parameters::{ModelParameters, Parameter, ParameterKind, ROW_EXCESS_TOLERANCE};
pub use results::{ModelOutcomes, OutcomeSeries, OutcomeSummary, PrevalencePoint, SeriesPoint};
pub use states::{
    DEAD, DEAD_NAME, HEALTHY, HEALTHY_NAME, SICK, SICK_NAME, StateId, StateSpace, StateVector,
};
pub use trace::{
    CohortTrace, DEFAULT_MASS_TOLERANCE, DriftEvent, DriftPolicy, DriftReport, TraceOptions,
    TraceRow,
};
