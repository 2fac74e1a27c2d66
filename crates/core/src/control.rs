//! Typed animation control.
//!
//! Anything that wants to trigger a hero animation holds an
//! [`AnimationController`]; the stage owns the matching [`AnimationInbox`]
//! and drains it once per frame.

use std::sync::mpsc::{self, Receiver, Sender};

use rand::Rng;
use rand::seq::IndexedRandom;
use scrollstage_protocol::AnimationCommand;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("unknown animation: {0}")]
    UnknownAnimation(String),
    #[error("no animations to choose from")]
    EmptyLibrary,
    #[error("animation inbox is gone")]
    Disconnected,
}

pub fn channel() -> (AnimationController, AnimationInbox) {
    let (tx, rx) = mpsc::channel();
    (AnimationController { tx }, AnimationInbox { rx })
}

/// Sending half. Cheap to clone and hand out.
#[derive(Debug, Clone)]
pub struct AnimationController {
    tx: Sender<AnimationCommand>,
}

impl AnimationController {
    pub fn send(&self, command: AnimationCommand) -> Result<(), ControlError> {
        self.tx.send(command).map_err(|_| ControlError::Disconnected)
    }

    pub fn play(&self, name: impl Into<String>) -> Result<(), ControlError> {
        self.send(AnimationCommand::Play { name: name.into() })
    }

    pub fn play_random(&self) -> Result<(), ControlError> {
        self.send(AnimationCommand::PlayRandom)
    }

    pub fn stop(&self) -> Result<(), ControlError> {
        self.send(AnimationCommand::Stop)
    }

    pub fn trigger_glitch(&self) -> Result<(), ControlError> {
        self.send(AnimationCommand::TriggerGlitch)
    }
}

#[derive(Debug)]
pub struct AnimationInbox {
    rx: Receiver<AnimationCommand>,
}

impl AnimationInbox {
    /// Everything sent since the last drain, in send order.
    pub fn drain(&self) -> Vec<AnimationCommand> {
        self.rx.try_iter().collect()
    }
}

/// Current clip of the hero scene.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clips: Vec<String>,
    current: Option<usize>,
}

impl AnimationPlayer {
    pub fn new(clips: Vec<String>) -> Self {
        Self {
            clips,
            current: None,
        }
    }

    pub fn clips(&self) -> &[String] {
        &self.clips
    }

    pub fn current(&self) -> Option<&str> {
        self.current.map(|i| self.clips[i].as_str())
    }

    pub fn play(&mut self, name: &str) -> Result<&str, ControlError> {
        let Some(index) = self.clips.iter().position(|c| c == name) else {
            warn!(name, "unknown animation requested");
            return Err(ControlError::UnknownAnimation(name.to_string()));
        };
        self.current = Some(index);
        debug!(name, "playing animation");
        Ok(self.clips[index].as_str())
    }

    /// Pick uniformly among clips other than the current one. With a single
    /// clip that clip is replayed.
    pub fn play_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&str, ControlError> {
        let candidates: Vec<usize> = (0..self.clips.len())
            .filter(|&i| Some(i) != self.current || self.clips.len() == 1)
            .collect();
        let Some(&index) = candidates.choose(rng) else {
            return Err(ControlError::EmptyLibrary);
        };
        self.current = Some(index);
        debug!(name = %self.clips[index], "playing random animation");
        Ok(self.clips[index].as_str())
    }

    pub fn stop(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn player() -> AnimationPlayer {
        AnimationPlayer::new(vec!["idle".into(), "wave".into(), "jump".into()])
    }

    #[test]
    fn commands_arrive_in_order() {
        let (controller, inbox) = channel();
        let other = controller.clone();
        assert!(controller.play("wave").is_ok());
        assert!(other.play_random().is_ok());
        assert!(controller.trigger_glitch().is_ok());
        assert_eq!(
            inbox.drain(),
            vec![
                AnimationCommand::Play {
                    name: "wave".into()
                },
                AnimationCommand::PlayRandom,
                AnimationCommand::TriggerGlitch,
            ]
        );
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn send_after_inbox_dropped_fails() {
        let (controller, inbox) = channel();
        drop(inbox);
        assert_eq!(controller.stop(), Err(ControlError::Disconnected));
    }

    #[test]
    fn play_by_name() {
        let mut p = player();
        assert_eq!(p.play("jump"), Ok("jump"));
        assert_eq!(p.current(), Some("jump"));
        assert_eq!(
            p.play("moonwalk"),
            Err(ControlError::UnknownAnimation("moonwalk".into()))
        );
        assert_eq!(p.current(), Some("jump"));
        p.stop();
        assert_eq!(p.current(), None);
    }

    #[test]
    fn random_never_repeats_current() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut p = player();
        let mut last = p.play_random(&mut rng).map(str::to_string);
        for _ in 0..100 {
            let next = p.play_random(&mut rng).map(str::to_string);
            assert!(next.is_ok());
            assert_ne!(next, last);
            last = next;
        }
    }

    #[test]
    fn random_with_one_clip_replays_it() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut p = AnimationPlayer::new(vec!["idle".into()]);
        assert_eq!(p.play_random(&mut rng), Ok("idle"));
        assert_eq!(p.play_random(&mut rng), Ok("idle"));
    }

    #[test]
    fn random_from_empty_library() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut p = AnimationPlayer::new(Vec::new());
        assert_eq!(p.play_random(&mut rng), Err(ControlError::EmptyLibrary));
    }
}
