//! Multi-level level-ups.
//!
//! An XP award can cross several thresholds at once. [`LevelUpSequence`]
//! queues one [`LevelStep`] per level gained and runs a [`LevelUpSession`]
//! for each in order, re-reading the character from the store between
//! steps so every level starts from the previous commit.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use hf_core::{CampaignStore, CharacterId};

use crate::commit::commit_level_up;
use crate::config::ProgressionConfig;
use crate::error::{MechError, MechResult};
use crate::levelup::{HitPointGain, LevelUpSession};

/// One queued single-level advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStep {
    /// The level this step advances to.
    pub target_level: u32,
    /// XP total written with every step of the sequence.
    pub target_experience: u64,
    /// XP total before the sequence was triggered.
    pub original_experience: u64,
}

/// What happened after a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceProgress {
    /// A new session is open for the next level.
    Advanced {
        /// The level the new session targets.
        next_level: u32,
    },
    /// Every queued level is committed. Reported once.
    Completed {
        /// The character's level now.
        final_level: u32,
    },
}

/// An in-progress run of one or more level-ups for a single character.
#[derive(Debug)]
pub struct LevelUpSequence {
    character: CharacterId,
    queue: Vec<LevelStep>,
    index: usize,
    session: Option<LevelUpSession>,
    rng: StdRng,
}

impl LevelUpSequence {
    /// Award `new_experience` to a character and open the first level-up.
    ///
    /// Writes the new XP immediately. Fails without writing if the total
    /// does not reach a level above the current one.
    pub fn trigger<S: CampaignStore + ?Sized>(
        store: &mut S,
        id: CharacterId,
        new_experience: u64,
        config: &ProgressionConfig,
    ) -> MechResult<Self> {
        let character = store.character(id).ok_or(MechError::CharacterNotFound(id))?;
        let target_level = config.experience.level_for(new_experience);
        if target_level <= character.level {
            return Err(MechError::NoLevelGained {
                level: character.level,
                experience: new_experience,
            });
        }

        let queue: Vec<LevelStep> = (character.level + 1..=target_level)
            .map(|level| LevelStep {
                target_level: level,
                target_experience: new_experience,
                original_experience: character.experience,
            })
            .collect();

        store.set_experience(id, new_experience)?;
        let session = match LevelUpSession::open(store, id, queue[0]) {
            Ok(session) => session,
            Err(e) => {
                store.set_experience(id, character.experience)?;
                return Err(e);
            }
        };

        tracing::info!(
            character = %id,
            name = %character.name,
            from = character.level,
            to = target_level,
            levels = queue.len(),
            "level-up triggered"
        );
        Ok(Self {
            character: id,
            queue,
            index: 0,
            session: Some(session),
            rng: config.rng(),
        })
    }

    /// The character being advanced.
    pub fn character(&self) -> CharacterId {
        self.character
    }

    /// Every queued step, committed ones included.
    pub fn queue(&self) -> &[LevelStep] {
        &self.queue
    }

    /// The step currently open.
    pub fn current_step(&self) -> Option<&LevelStep> {
        self.session.as_ref().map(LevelUpSession::target)
    }

    /// Steps not yet committed, the open one included.
    pub fn remaining(&self) -> usize {
        if self.session.is_some() {
            self.queue.len() - self.index
        } else {
            0
        }
    }

    /// Returns true once completed or cancelled.
    pub fn is_finished(&self) -> bool {
        self.session.is_none()
    }

    /// The open session.
    pub fn session(&self) -> Option<&LevelUpSession> {
        self.session.as_ref()
    }

    /// The open session, for driving its steps.
    pub fn session_mut(&mut self) -> Option<&mut LevelUpSession> {
        self.session.as_mut()
    }

    /// Roll hit points in the open session with the sequence's RNG.
    pub fn roll_hit_points(&mut self) -> MechResult<HitPointGain> {
        let session = self.session.as_mut().ok_or(MechError::SequenceFinished)?;
        session.roll_hit_points(&mut self.rng)
    }

    /// Commit the open session through the commit endpoint and move on.
    ///
    /// A rejected commit leaves the session on `Confirm` for another try.
    /// A terminal rejection (unauthorized, not found), or a failure to open
    /// the next level, cancels the rest of the sequence before the error is
    /// returned.
    pub fn commit<S: CampaignStore + ?Sized>(
        &mut self,
        store: &mut S,
        requester: Option<&str>,
    ) -> MechResult<SequenceProgress> {
        let id = self.character;
        let session = self.session.as_mut().ok_or(MechError::SequenceFinished)?;
        let committed =
            match session.commit_with(|request| commit_level_up(store, requester, id, request)) {
                Ok(character) => character,
                Err(MechError::Commit(e)) if e.is_terminal() => {
                    tracing::warn!(character = %id, error = %e, "terminal commit error, abandoning sequence");
                    self.abandon(store);
                    return Err(MechError::Commit(e));
                }
                Err(e) => return Err(e),
            };

        self.index += 1;
        match self.queue.get(self.index) {
            Some(&next) => {
                let session = match LevelUpSession::open(store, id, next) {
                    Ok(session) => session,
                    Err(e) => {
                        tracing::warn!(
                            character = %id,
                            level = next.target_level,
                            error = %e,
                            "could not open next level-up, abandoning sequence"
                        );
                        self.abandon(store);
                        return Err(e);
                    }
                };
                self.session = Some(session);
                Ok(SequenceProgress::Advanced {
                    next_level: next.target_level,
                })
            }
            None => {
                self.session = None;
                tracing::info!(character = %id, level = committed.level, "level-up sequence complete");
                Ok(SequenceProgress::Completed {
                    final_level: committed.level,
                })
            }
        }
    }

    /// Cancel the sequence: revert XP to its pre-trigger value and drop
    /// every remaining step. Levels already committed stay.
    pub fn cancel<S: CampaignStore + ?Sized>(&mut self, store: &mut S) -> MechResult<()> {
        let session = self.session.as_mut().ok_or(MechError::SequenceFinished)?;
        session.cancel()?;
        let original = self.queue[self.index].original_experience;
        store.set_experience(self.character, original)?;
        tracing::warn!(
            character = %self.character,
            reverted_to = original,
            dropped = self.queue.len() - self.index,
            "level-up sequence cancelled"
        );
        self.session = None;
        self.queue.truncate(self.index);
        Ok(())
    }

    fn abandon<S: CampaignStore + ?Sized>(&mut self, store: &mut S) {
        let original = self.queue[self.index].original_experience;
        if let Err(e) = store.set_experience(self.character, original) {
            tracing::warn!(character = %self.character, error = %e, "could not revert experience");
        }
        self.session = None;
        self.queue.truncate(self.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::CommitError;
    use crate::derive::derive_for_character;
    use crate::levelup::StepKind;
    use hf_core::{
        Attribute, AttributeSet, Campaign, CampaignMeta, CharacterClass, CharacterSnapshot,
        ClassBaseAttributes,
    };

    fn fighter() -> CharacterClass {
        let mut class = CharacterClass::new("Fighter").with_hit_die("1d10");
        for level in 1..=6 {
            let level_i = i32::try_from(level).unwrap();
            class = class.with_level(ClassBaseAttributes {
                level,
                attack: level_i,
                armor_class: 12 + level_i,
                fortitude: 2 + level_i / 2,
                skill_ranks: 1,
                ..ClassBaseAttributes::default()
            });
        }
        class
    }

    fn campaign() -> (Campaign, CharacterId) {
        let mut campaign = Campaign::new(CampaignMeta::new("Test"));
        campaign.add_class(fighter()).unwrap();
        let id = campaign
            .add_character(
                CharacterSnapshot::new("Brenna", "Fighter")
                    .with_owner("ana")
                    .with_attributes(AttributeSet::uniform(12))
                    .with_hp(10)
                    .with_experience(200)
                    .with_skill("Climb", 0)
                    .with_skill("Swim", 0),
            )
            .unwrap();
        (campaign, id)
    }

    fn config() -> ProgressionConfig {
        ProgressionConfig::default().with_seed(17)
    }

    fn fill_and_confirm(sequence: &mut LevelUpSequence) {
        let session = sequence.session_mut().unwrap();
        session.increment_attribute(Attribute::Strength).unwrap();
        session.increment_attribute(Attribute::Dexterity).unwrap();
        session.next().unwrap();
        session.increment_skill("Climb").unwrap();
        session.next().unwrap();
        sequence.roll_hit_points().unwrap();
        sequence.session_mut().unwrap().next().unwrap();
    }

    #[test]
    fn jump_from_one_to_four_queues_three_steps() {
        let (mut campaign, id) = campaign();
        let sequence = LevelUpSequence::trigger(&mut campaign, id, 6_000, &config()).unwrap();
        let levels: Vec<u32> = sequence.queue().iter().map(|s| s.target_level).collect();
        assert_eq!(levels, vec![2, 3, 4]);
        assert!(sequence
            .queue()
            .iter()
            .all(|s| s.target_experience == 6_000 && s.original_experience == 200));
        assert_eq!(campaign.get_character(id).unwrap().experience, 6_000);
        assert_eq!(sequence.remaining(), 3);
    }

    #[test]
    fn no_level_gained_writes_nothing() {
        let (mut campaign, id) = campaign();
        let err = LevelUpSequence::trigger(&mut campaign, id, 999, &config()).unwrap_err();
        assert!(matches!(err, MechError::NoLevelGained { level: 1, .. }));
        assert_eq!(campaign.get_character(id).unwrap().experience, 200);
    }

    #[test]
    fn completes_exactly_once() {
        let (mut campaign, id) = campaign();
        let mut sequence = LevelUpSequence::trigger(&mut campaign, id, 3_000, &config()).unwrap();

        fill_and_confirm(&mut sequence);
        assert_eq!(
            sequence.commit(&mut campaign, Some("ana")).unwrap(),
            SequenceProgress::Advanced { next_level: 3 }
        );
        assert_eq!(sequence.session().unwrap().kind(), StepKind::Attributes);
        assert_eq!(sequence.session().unwrap().character().level, 2);

        fill_and_confirm(&mut sequence);
        assert_eq!(
            sequence.commit(&mut campaign, Some("ana")).unwrap(),
            SequenceProgress::Completed { final_level: 3 }
        );
        assert!(sequence.is_finished());
        assert!(matches!(
            sequence.commit(&mut campaign, Some("ana")),
            Err(MechError::SequenceFinished)
        ));

        let character = campaign.get_character(id).unwrap();
        assert_eq!(character.level, 3);
        assert_eq!(character.experience, 3_000);
        assert_eq!(character.attributes.strength, 14);
        assert_eq!(character.skills.get("Climb"), Some(&2));
        assert_eq!(campaign.history().len(), 2);
    }

    #[test]
    fn cancel_in_second_step_reverts_xp_and_drops_rest() {
        let (mut campaign, id) = campaign();
        let mut sequence = LevelUpSequence::trigger(&mut campaign, id, 6_000, &config()).unwrap();
        fill_and_confirm(&mut sequence);
        sequence.commit(&mut campaign, Some("ana")).unwrap();

        sequence.cancel(&mut campaign).unwrap();
        assert!(sequence.is_finished());
        assert_eq!(sequence.remaining(), 0);
        assert_eq!(sequence.queue().len(), 1);

        let character = campaign.get_character(id).unwrap();
        assert_eq!(character.experience, 200);
        assert_eq!(character.level, 2);
        assert!(sequence.cancel(&mut campaign).is_err());
    }

    #[test]
    fn rejected_commit_keeps_session() {
        let (mut campaign, id) = campaign();
        let mut sequence = LevelUpSequence::trigger(&mut campaign, id, 1_000, &config()).unwrap();
        fill_and_confirm(&mut sequence);

        // Someone else levels the character first; the request is now stale
        let mut stale = campaign.get_character(id).unwrap().clone();
        stale.level = 2;
        campaign.save_character(stale).unwrap();

        let err = sequence.commit(&mut campaign, Some("ana")).unwrap_err();
        assert!(matches!(
            err,
            MechError::Commit(CommitError::InvalidLevelProgression(_))
        ));
        assert_eq!(sequence.session().unwrap().kind(), StepKind::Confirm);
    }

    #[test]
    fn terminal_error_abandons_sequence() {
        let (mut campaign, id) = campaign();
        let mut sequence = LevelUpSequence::trigger(&mut campaign, id, 1_000, &config()).unwrap();
        fill_and_confirm(&mut sequence);

        let err = sequence.commit(&mut campaign, Some("bo")).unwrap_err();
        assert!(matches!(err, MechError::Commit(CommitError::NotFound)));
        assert!(sequence.is_finished());
        assert_eq!(campaign.get_character(id).unwrap().experience, 200);
    }

    #[test]
    fn committed_character_derives_fresh_stats() {
        let (mut campaign, id) = campaign();
        let mut sequence = LevelUpSequence::trigger(&mut campaign, id, 1_000, &config()).unwrap();
        let before = derive_for_character(
            campaign.get_character(id).unwrap(),
            campaign.find_class("Fighter").unwrap(),
        )
        .unwrap();
        fill_and_confirm(&mut sequence);
        sequence.commit(&mut campaign, Some("ana")).unwrap();

        let character = campaign.get_character(id).unwrap();
        let after =
            derive_for_character(character, campaign.find_class("Fighter").unwrap()).unwrap();
        assert_eq!(after.offense.attack, 2);
        assert_eq!(after.defense.armor_class, before.defense.armor_class + 1);
        // DEX 12 -> 13 keeps +1; the class row supplies the rest
        assert_eq!(after.modifiers.dexterity, 1);
        assert_eq!(after.misc.skill_ranks, 1);
    }

    /// Hides the character from reads once a level-up has been saved.
    struct VanishesAfterSave {
        campaign: Campaign,
        saved: bool,
    }

    impl CampaignStore for VanishesAfterSave {
        fn character(&self, id: CharacterId) -> Option<CharacterSnapshot> {
            if self.saved {
                None
            } else {
                self.campaign.character(id)
            }
        }

        fn class(&self, name: &str) -> Option<CharacterClass> {
            self.campaign.class(name)
        }

        fn save_character(&mut self, character: CharacterSnapshot) -> hf_core::CoreResult<()> {
            self.saved = true;
            self.campaign.save_character(character)
        }

        fn set_experience(&mut self, id: CharacterId, experience: u64) -> hf_core::CoreResult<()> {
            self.campaign.set_experience(id, experience)
        }
    }

    #[test]
    fn failing_to_open_next_level_reverts_experience() {
        let (campaign, id) = campaign();
        let mut store = VanishesAfterSave {
            campaign,
            saved: false,
        };
        let mut sequence = LevelUpSequence::trigger(&mut store, id, 3_000, &config()).unwrap();
        fill_and_confirm(&mut sequence);

        let err = sequence.commit(&mut store, Some("ana")).unwrap_err();
        assert!(matches!(err, MechError::CharacterNotFound(_)));
        assert!(sequence.is_finished());
        assert_eq!(sequence.queue().len(), 1);
        assert!(matches!(
            sequence.cancel(&mut store),
            Err(MechError::SequenceFinished)
        ));

        let character = store.campaign.get_character(id).unwrap();
        assert_eq!(character.level, 2);
        assert_eq!(character.experience, 200);
    }
}
