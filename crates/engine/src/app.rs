//! Application state and composition.

use std::sync::Arc;

use talewright_domain::GameRules;

use crate::config::EngineConfig;
use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    ports::{ClockPort, RandomPort, SessionRepo},
};
use crate::stores::SessionMailboxes;
use crate::use_cases;

/// Main application state.
///
/// Holds the store, the session mailboxes and every use case.
pub struct App {
    pub repositories: Repositories,
    pub mailboxes: Arc<SessionMailboxes>,
    pub use_cases: UseCases,
}

/// Container for the store ports.
pub struct Repositories {
    pub session: Arc<dyn SessionRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub lobby: use_cases::LobbyUseCases,
    pub setup: use_cases::SetupUseCases,
    pub gameplay: use_cases::GameplayUseCases,
    pub query: use_cases::QueryUseCases,
    pub maintenance: use_cases::MaintenanceUseCases,
}

impl App {
    /// Create a new App over `session_repo` with the system clock and dice.
    pub fn new(session_repo: Arc<dyn SessionRepo>, config: &EngineConfig) -> Self {
        Self::with_ports(
            session_repo,
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
            config,
        )
    }

    /// Create an App with explicit clock and random ports.
    pub fn with_ports(
        session_repo: Arc<dyn SessionRepo>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        config: &EngineConfig,
    ) -> Self {
        let rules: Arc<GameRules> = Arc::new(config.rules.clone());
        let mailboxes = Arc::new(SessionMailboxes::new(
            session_repo.clone(),
            config.mailbox_capacity,
        ));

        let lobby = use_cases::LobbyUseCases::new(
            Arc::new(use_cases::lobby::CreateSession::new(
                session_repo.clone(),
                clock.clone(),
            )),
            Arc::new(use_cases::lobby::JoinSession::new(mailboxes.clone())),
            Arc::new(use_cases::lobby::LeaveSession::new(mailboxes.clone())),
            Arc::new(use_cases::lobby::StartGame::new(mailboxes.clone())),
            Arc::new(use_cases::lobby::RecordGmPresence::new(
                mailboxes.clone(),
                clock.clone(),
            )),
        );

        let setup = use_cases::SetupUseCases {
            submit_player_roll: Arc::new(use_cases::setup::SubmitPlayerRoll::new(
                mailboxes.clone(),
                random.clone(),
                clock.clone(),
                rules.clone(),
            )),
            submit_world_definition: Arc::new(use_cases::setup::SubmitWorldDefinition::new(
                mailboxes.clone(),
            )),
            submit_world_truth: Arc::new(use_cases::setup::SubmitWorldTruth::new(
                mailboxes.clone(),
            )),
            submit_character_concept: Arc::new(use_cases::setup::SubmitCharacterConcept::new(
                mailboxes.clone(),
            )),
            submit_skill_roll: Arc::new(use_cases::setup::SubmitSkillRoll::new(
                mailboxes.clone(),
                random.clone(),
                clock.clone(),
                rules.clone(),
            )),
            add_player_skill: Arc::new(use_cases::setup::AddPlayerSkill::new(mailboxes.clone())),
            remove_player_skill: Arc::new(use_cases::setup::RemovePlayerSkill::new(
                mailboxes.clone(),
            )),
            finalize_player_skills: Arc::new(use_cases::setup::FinalizePlayerSkills::new(
                mailboxes.clone(),
            )),
            add_gm_skill: Arc::new(use_cases::setup::AddGmSkill::new(
                mailboxes.clone(),
                rules.clone(),
            )),
            remove_gm_skill: Arc::new(use_cases::setup::RemoveGmSkill::new(mailboxes.clone())),
            finalize_gm_skills: Arc::new(use_cases::setup::FinalizeGmSkills::new(
                mailboxes.clone(),
                rules.clone(),
            )),
            assign_skill_modifier: Arc::new(use_cases::setup::AssignSkillModifier::new(
                mailboxes.clone(),
                rules.clone(),
            )),
            finalize_skill_modifiers: Arc::new(use_cases::setup::FinalizeSkillModifiers::new(
                mailboxes.clone(),
                rules.clone(),
            )),
        };

        let gameplay = use_cases::GameplayUseCases::new(
            Arc::new(use_cases::gameplay::InitiateGameplay::new(
                mailboxes.clone(),
                clock.clone(),
                rules.clone(),
            )),
            Arc::new(use_cases::gameplay::RollDice::new(
                mailboxes.clone(),
                random,
                clock.clone(),
                rules.clone(),
            )),
            Arc::new(use_cases::gameplay::UseInterferenceToken::new(
                mailboxes.clone(),
                clock.clone(),
                rules.clone(),
            )),
            Arc::new(use_cases::gameplay::EditPlayerState::new(
                mailboxes.clone(),
                clock,
                rules,
            )),
        );

        let query = use_cases::QueryUseCases::new(
            Arc::new(use_cases::query::GetSession::new(session_repo.clone())),
            Arc::new(use_cases::query::WatchSession::new(session_repo.clone())),
        );

        let maintenance = use_cases::MaintenanceUseCases::new(Arc::new(
            use_cases::maintenance::SweepStaleSessions::new(
                session_repo.clone(),
                mailboxes.clone(),
                config.stale_session_after,
            ),
        ));

        Self {
            repositories: Repositories {
                session: session_repo,
            },
            mailboxes,
            use_cases: UseCases {
                lobby,
                setup,
                gameplay,
                query,
                maintenance,
            },
        }
    }
}
