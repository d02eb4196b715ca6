//! Turn-taking and context-propagation protocols for text-generation agents.
//!
//! This crate has no opinion about which model answers; it only needs a
//! [`Generator`](backend::Generator). What it does decide:
//!
//! - what each agent sees before it speaks (`context`, `agent`)
//! - whose turn it is and where every answer is fanned out to (`dialogue`)
//! - when a critique/refine cycle may stop (`refinement`)
//!
//! Everything runs on one task, one generation call at a time. Sessions that
//! need isolation from each other should each own their own [`Roster`].
//!
//! # Modules
//!
//! | Module       | Purpose                                               |
//! |--------------|-------------------------------------------------------|
//! | `context`    | Append-only shared/individual memory per agent        |
//! | `agent`      | Capability-tagged agents rendering fixed-order prompts|
//! | `roster`     | Ordered agent collection, capability filters          |
//! | `dialogue`   | Panel and two-party exchange protocols                |
//! | `transcript` | Append-only dialogue log with text/JSON rendering     |
//! | `team`       | Research → dialogue → reflection → article operations |
//! | `refinement` | Bounded producer/critic loop with literal acceptance  |
//! | `sink`       | Overwrite/append write targets for outputs            |
//! | `errors`     | Error taxonomy with retry classification              |

pub mod agent;
pub mod backend;
pub mod context;
pub mod dialogue;
pub mod errors;
pub mod observer;
pub mod prompts;
pub mod refinement;
pub mod roster;
pub mod sink;
pub mod team;
pub mod testing;
pub mod transcript;

pub use agent::{Agent, Capability};
pub use backend::{GenerationError, Generator};
pub use context::{ContextSegment, ContextStore};
pub use dialogue::{DialogueCoordinator, DialogueStyle, MIN_PARTICIPANTS};
pub use errors::{CoordinationError, RetryCategory};
pub use observer::{SilentObserver, TurnObserver};
pub use refinement::{
    Artifact, Critique, RefinementLoop, RefinementOutcome, RefinementState,
    DEFAULT_ACCEPTANCE_PHRASE, DEFAULT_MAX_ITERATIONS,
};
pub use roster::Roster;
pub use sink::{ArtifactSink, MemorySink};
pub use team::ResearchTeam;
pub use transcript::{DialogueTranscript, TranscriptEntry, TurnKind};
