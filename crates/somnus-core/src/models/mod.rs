mod contradiction;
mod episodic_event;
mod evidence;
mod lifecycle;
mod pattern;
mod pending_update;
mod run_report;
mod semantic_memory;
mod strategy;

pub use contradiction::{Contradiction, ContradictionStatus, ContradictionType, Resolution};
pub use episodic_event::{ConsolidationState, EpisodicEvent, EventType};
pub use evidence::EvidenceType;
pub use lifecycle::LifecycleState;
pub use pattern::{Pattern, PatternType};
pub use pending_update::PendingUpdate;
pub use run_report::{RunReport, RunStatus};
pub use semantic_memory::SemanticMemory;
pub use strategy::ConsolidationStrategy;
