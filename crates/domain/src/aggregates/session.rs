//! Session aggregate - one game from lobby through active play
//!
//! The whole game lives in this single document: roster, status, the setup
//! sequencer's working memory and the live gameplay state. The setup and
//! gameplay rules are implemented as further `impl Session` blocks in
//! [`crate::setup`] and [`crate::gameplay`].
//!
//! # Rustic DDD Design
//!
//! - **Crate-private fields**: outside this crate the document is read-only
//! - **Validate, then mutate**: every operation checks all preconditions before
//!   touching a field

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::gameplay::GameplayState;
use crate::ids::{ParticipantId, SessionId};
use crate::setup::{SetupPhase, SetupState};
use crate::value_objects::SessionName;

/// Account information copied from the identity provider when someone joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    pub id: ParticipantId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_summary: Option<String>,
}

impl ParticipantProfile {
    pub fn new(id: ParticipantId, display_name: impl Into<String>) -> Result<Self, DomainError> {
        let display_name = display_name.into().trim().to_string();
        if display_name.is_empty() {
            return Err(DomainError::validation("Display name cannot be empty"));
        }
        Ok(Self {
            id,
            display_name,
            avatar_url: None,
            character_summary: None,
        })
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    pub fn with_character_summary(mut self, summary: impl Into<String>) -> Self {
        self.character_summary = Some(summary.into());
        self
    }
}

/// Lifecycle status. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Lobby,
    InProgress,
    Finished,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::InProgress => write!(f, "in progress"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Label used in phase errors once gameplay has been initialised
const ACTIVE_PLAY_LABEL: &str = "active play";

/// A game session document
///
/// # Invariants
///
/// - `setup` is present iff `status != Lobby`
/// - `gameplay` is present only while `setup.current_phase == AwaitingGameStart`
/// - the GM is never on the player roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) name: SessionName,
    pub(crate) gm: ParticipantProfile,
    pub(crate) roster: Vec<ParticipantProfile>,
    pub(crate) status: SessionStatus,
    #[serde(default)]
    pub(crate) setup: Option<SetupState>,
    #[serde(default)]
    pub(crate) gameplay: Option<GameplayState>,
    pub(crate) gm_last_seen_at: DateTime<Utc>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Session {
    /// Document field holding the GM presence heartbeat, for targeted updates.
    pub const GM_LAST_SEEN_FIELD: &'static str = "gmLastSeenAt";

    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create an empty lobby owned by `gm`.
    pub fn new(name: SessionName, gm: ParticipantProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            name,
            gm,
            roster: Vec::new(),
            status: SessionStatus::Lobby,
            setup: None,
            gameplay: None,
            gm_last_seen_at: now,
            created_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &SessionName {
        &self.name
    }

    #[inline]
    pub fn gm(&self) -> &ParticipantProfile {
        &self.gm
    }

    #[inline]
    pub fn gm_id(&self) -> &ParticipantId {
        &self.gm.id
    }

    #[inline]
    pub fn roster(&self) -> &[ParticipantProfile] {
        &self.roster
    }

    #[inline]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[inline]
    pub fn setup(&self) -> Option<&SetupState> {
        self.setup.as_ref()
    }

    #[inline]
    pub fn gameplay(&self) -> Option<&GameplayState> {
        self.gameplay.as_ref()
    }

    #[inline]
    pub fn gm_last_seen_at(&self) -> DateTime<Utc> {
        self.gm_last_seen_at
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&ParticipantProfile> {
        self.roster.iter().find(|p| &p.id == id)
    }

    pub fn is_gm(&self, id: &ParticipantId) -> bool {
        &self.gm.id == id
    }

    /// Gameplay has been initialised and the session is still running.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::InProgress && self.gameplay.is_some()
    }

    /// Human-readable name of where the session currently stands.
    pub fn phase_label(&self) -> String {
        match (&self.status, &self.setup) {
            (SessionStatus::InProgress, _) if self.gameplay.is_some() => {
                ACTIVE_PLAY_LABEL.to_string()
            }
            (SessionStatus::InProgress, Some(setup)) => setup.current_phase.to_string(),
            (status, _) => status.to_string(),
        }
    }

    /// Empty roster and no GM heartbeat within `threshold`.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.roster.is_empty() && now.signed_duration_since(self.gm_last_seen_at) > threshold
    }

    // =========================================================================
    // Lobby
    // =========================================================================

    /// Add a player to the lobby, or refresh their profile if already present.
    pub fn join(&mut self, profile: ParticipantProfile) -> Result<(), DomainError> {
        if self.status != SessionStatus::Lobby {
            return Err(DomainError::wrong_phase(SessionStatus::Lobby, self.phase_label()));
        }
        if self.is_gm(&profile.id) {
            return Err(DomainError::validation(
                "The GM cannot join their own session as a player",
            ));
        }
        match self.roster.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.roster.push(profile),
        }
        Ok(())
    }

    /// Remove a player. Allowed in any status; setup keeps its captured counts.
    pub fn leave(&mut self, participant: &ParticipantId) -> Result<(), DomainError> {
        let index = self
            .roster
            .iter()
            .position(|p| &p.id == participant)
            .ok_or_else(|| {
                DomainError::validation(format!("{} is not in this session", participant))
            })?;
        self.roster.remove(index);
        Ok(())
    }

    /// GM moves the lobby into setup; the current roster size becomes the
    /// fixed denominator for every "has everyone reported" check.
    pub fn start_game(&mut self, caller: &ParticipantId) -> Result<(), DomainError> {
        self.ensure_gm(caller, "start the game")?;
        if self.status != SessionStatus::Lobby {
            return Err(DomainError::wrong_phase(SessionStatus::Lobby, self.phase_label()));
        }
        if self.roster.is_empty() {
            return Err(DomainError::incomplete("at least one player must join"));
        }
        self.setup = Some(SetupState::new(self.roster.len()));
        self.status = SessionStatus::InProgress;
        Ok(())
    }

    /// Record that the GM is still around.
    pub fn touch_gm_presence(
        &mut self,
        caller: &ParticipantId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_gm(caller, "report GM presence")?;
        self.gm_last_seen_at = now;
        Ok(())
    }

    // =========================================================================
    // Shared guards
    // =========================================================================

    pub fn ensure_gm(&self, caller: &ParticipantId, action: &'static str) -> Result<(), DomainError> {
        if self.is_gm(caller) {
            Ok(())
        } else {
            Err(DomainError::not_authorized(action))
        }
    }

    pub(crate) fn require_player(
        &self,
        participant: &ParticipantId,
    ) -> Result<&ParticipantProfile, DomainError> {
        self.participant(participant).ok_or_else(|| {
            DomainError::validation(format!("{} is not a player in this session", participant))
        })
    }

    pub(crate) fn setup_ref(&self) -> Result<&SetupState, DomainError> {
        self.setup.as_ref().ok_or(DomainError::SetupNotInitialized)
    }

    pub(crate) fn setup_mut(&mut self) -> Result<&mut SetupState, DomainError> {
        self.setup.as_mut().ok_or(DomainError::SetupNotInitialized)
    }

    /// Setup exists, is in `expected`, and gameplay has not taken over.
    pub(crate) fn require_setup_phase(&self, expected: SetupPhase) -> Result<(), DomainError> {
        let setup = self.setup_ref()?;
        if setup.current_phase != expected || self.gameplay.is_some() {
            return Err(DomainError::wrong_phase(expected, self.phase_label()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> ParticipantProfile {
        ParticipantProfile::new(ParticipantId::new(id).unwrap(), id.to_uppercase()).unwrap()
    }

    fn lobby() -> Session {
        Session::new(SessionName::new("Friday game").unwrap(), profile("gm"), Utc::now())
    }

    #[test]
    fn new_session_is_an_empty_lobby() {
        let session = lobby();
        assert_eq!(session.status(), SessionStatus::Lobby);
        assert!(session.roster().is_empty());
        assert!(session.setup().is_none());
        assert!(session.gameplay().is_none());
        assert_eq!(session.phase_label(), "lobby");
    }

    #[test]
    fn rejoining_replaces_instead_of_duplicating() {
        let mut session = lobby();
        session.join(profile("ana")).unwrap();
        session
            .join(profile("ana").with_avatar("https://img/ana.png"))
            .unwrap();
        assert_eq!(session.roster().len(), 1);
        assert_eq!(
            session.roster()[0].avatar_url.as_deref(),
            Some("https://img/ana.png")
        );
    }

    #[test]
    fn gm_cannot_join_as_player() {
        let mut session = lobby();
        assert!(matches!(
            session.join(profile("gm")),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn only_gm_can_start() {
        let mut session = lobby();
        session.join(profile("ana")).unwrap();
        let ana = ParticipantId::new("ana").unwrap();
        assert!(matches!(
            session.start_game(&ana),
            Err(DomainError::NotAuthorized { .. })
        ));
    }

    #[test]
    fn start_requires_players() {
        let mut session = lobby();
        let gm = session.gm_id().clone();
        assert!(matches!(
            session.start_game(&gm),
            Err(DomainError::IncompleteSelection(_))
        ));
    }

    #[test]
    fn start_captures_roster_size_and_enters_rolling() {
        let mut session = lobby();
        session.join(profile("ana")).unwrap();
        session.join(profile("bo")).unwrap();
        let gm = session.gm_id().clone();
        session.start_game(&gm).unwrap();

        let setup = session.setup().unwrap();
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(setup.num_players_at_setup_start, 2);
        assert_eq!(setup.current_phase, SetupPhase::Rolling);
    }

    #[test]
    fn join_after_start_is_wrong_phase() {
        let mut session = lobby();
        session.join(profile("ana")).unwrap();
        let gm = session.gm_id().clone();
        session.start_game(&gm).unwrap();
        assert!(matches!(
            session.join(profile("late")),
            Err(DomainError::WrongPhase { .. })
        ));
    }

    #[test]
    fn start_twice_is_wrong_phase() {
        let mut session = lobby();
        session.join(profile("ana")).unwrap();
        let gm = session.gm_id().clone();
        session.start_game(&gm).unwrap();
        assert!(matches!(
            session.start_game(&gm),
            Err(DomainError::WrongPhase { .. })
        ));
    }

    #[test]
    fn leaving_does_not_change_captured_count() {
        let mut session = lobby();
        session.join(profile("ana")).unwrap();
        session.join(profile("bo")).unwrap();
        let gm = session.gm_id().clone();
        session.start_game(&gm).unwrap();
        session.leave(&ParticipantId::new("bo").unwrap()).unwrap();

        assert_eq!(session.roster().len(), 1);
        assert_eq!(session.setup().unwrap().num_players_at_setup_start, 2);
    }

    #[test]
    fn leaving_unknown_participant_fails() {
        let mut session = lobby();
        assert!(session.leave(&ParticipantId::new("ghost").unwrap()).is_err());
    }

    #[test]
    fn stale_requires_empty_roster_and_old_heartbeat() {
        let then = Utc::now();
        let mut session =
            Session::new(SessionName::new("Old game").unwrap(), profile("gm"), then);
        let later = then + Duration::hours(73);
        assert!(session.is_stale(later, Duration::hours(72)));
        assert!(!session.is_stale(then + Duration::hours(71), Duration::hours(72)));

        session.join(profile("ana")).unwrap();
        assert!(!session.is_stale(later, Duration::hours(72)));
    }

    #[test]
    fn presence_is_gm_only() {
        let mut session = lobby();
        let later = session.gm_last_seen_at() + Duration::minutes(5);
        let gm = session.gm_id().clone();
        session.touch_gm_presence(&gm, later).unwrap();
        assert_eq!(session.gm_last_seen_at(), later);
        assert!(session
            .touch_gm_presence(&ParticipantId::new("ana").unwrap(), later)
            .is_err());
    }

    #[test]
    fn document_uses_camel_case_fields() {
        let session = lobby();
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get(Session::GM_LAST_SEEN_FIELD).is_some());
        assert_eq!(json["status"], "lobby");
        assert!(json["gm"].get("displayName").is_some());
    }
}
