//! Heads-up display state
//!
//! Text and icon elements the host draws on top of the scene. The HUD owns
//! the completion message and its auto-hide timers.

use smallvec::SmallVec;

use super::rect::{Anchor, Rect};

pub const COMPLETION_MESSAGE: &str = "CONGRATULATIONS! YOU HAVE COMPLETED THE GAME!";

/// A text label
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub rect: Rect,
    pub text: String,
    pub visible: bool,
}

impl TextElement {
    fn new(rect: Rect, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
            visible: true,
        }
    }
}

/// An icon that is either shown or hidden
#[derive(Debug, Clone, PartialEq)]
pub struct IconElement {
    pub rect: Rect,
    pub visible: bool,
}

/// All HUD elements
#[derive(Debug, Clone)]
pub struct Hud {
    pub score: TextElement,
    pub health: TextElement,
    pub coins: TextElement,
    pub keycard: IconElement,
    pub message: TextElement,
    /// Game times at which the message hides; never cancelled
    pending_hides: SmallVec<[f64; 2]>,
}

impl Hud {
    pub fn new(score: i32, health: i32) -> Self {
        let mut message = TextElement::new(
            Rect::new(0.0, 0.0, 600.0, 60.0).with_anchor(Anchor::Center),
            "",
        );
        message.visible = false;

        Self {
            score: TextElement::new(Rect::new(20.0, 20.0, 200.0, 30.0), score_text(score)),
            health: TextElement::new(Rect::new(20.0, 55.0, 200.0, 30.0), health_text(health)),
            coins: TextElement::new(Rect::new(20.0, 90.0, 200.0, 30.0), coins_text(0)),
            keycard: IconElement {
                rect: Rect::new(-20.0, 20.0, 48.0, 48.0).with_anchor(Anchor::TopRight),
                visible: false,
            },
            message,
            pending_hides: SmallVec::new(),
        }
    }

    pub fn set_score(&mut self, score: i32) {
        self.score.text = score_text(score);
    }

    pub fn set_health(&mut self, health: i32) {
        self.health.text = health_text(health);
    }

    pub fn set_coins(&mut self, coins: u32) {
        self.coins.text = coins_text(coins);
    }

    pub fn show_keycard(&mut self) {
        self.keycard.visible = true;
    }

    /// Show a message and schedule it to hide `duration` seconds after `now`
    pub fn show_message(&mut self, text: &str, now: f64, duration: f32) {
        self.message.text = text.to_string();
        self.message.visible = true;
        self.pending_hides.push(now + f64::from(duration));
    }

    /// Fire every hide whose time has come
    pub fn update(&mut self, now: f64) {
        let before = self.pending_hides.len();
        self.pending_hides.retain(|at| *at > now);
        if self.pending_hides.len() != before {
            self.message.visible = false;
        }
    }

    pub fn pending_hides(&self) -> usize {
        self.pending_hides.len()
    }
}

fn score_text(score: i32) -> String {
    format!("SCORE: {score}")
}

fn health_text(health: i32) -> String {
    format!("HEALTH: {health}")
}

fn coins_text(coins: u32) -> String {
    format!("COINS: {coins}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_hud() {
        let hud = Hud::new(0, 100);
        assert_eq!(hud.score.text, "SCORE: 0");
        assert_eq!(hud.health.text, "HEALTH: 100");
        assert!(!hud.keycard.visible);
        assert!(!hud.message.visible);
    }

    #[test]
    fn test_message_hides_after_duration() {
        let mut hud = Hud::new(0, 100);
        hud.show_message(COMPLETION_MESSAGE, 10.0, 3.0);
        assert!(hud.message.visible);

        hud.update(12.9);
        assert!(hud.message.visible);

        hud.update(13.0);
        assert!(!hud.message.visible);
        assert_eq!(hud.pending_hides(), 0);
    }

    #[test]
    fn test_earlier_hide_still_fires_after_reshow() {
        let mut hud = Hud::new(0, 100);
        hud.show_message(COMPLETION_MESSAGE, 0.0, 3.0);
        hud.show_message(COMPLETION_MESSAGE, 2.0, 3.0);

        // The first schedule is not cancelled by the second show
        hud.update(3.0);
        assert!(!hud.message.visible);
        assert_eq!(hud.pending_hides(), 1);

        hud.update(5.0);
        assert_eq!(hud.pending_hides(), 0);
    }
}
