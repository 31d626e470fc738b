use crate::model::card::Card;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A player's hand, kept in canonical order (suit group, then ascending
/// rank). The same order backs display and the legality checks, so both
/// are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

/// Integrity violations. These indicate a bug in the caller or the
/// engine, not a bad user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandError {
    #[error("card {0} is already in the hand")]
    DuplicateCard(Card),
    #[error("card {0} is not in the hand")]
    NotFound(Card),
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn insert(&mut self, card: Card) -> Result<(), HandError> {
        if self.contains(card) {
            return Err(HandError::DuplicateCard(card));
        }
        self.cards.push(card);
        self.sort();
        Ok(())
    }

    pub fn remove(&mut self, card: Card) -> Result<(), HandError> {
        match self.cards.iter().position(|&c| c == card) {
            Some(index) => {
                self.cards.remove(index);
                Ok(())
            }
            None => Err(HandError::NotFound(card)),
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.iter().any(|c| c.suit == suit)
    }

    pub fn min_in_suit(&self, suit: Suit) -> Option<Card> {
        self.cards
            .iter()
            .filter(|c| c.suit == suit)
            .min_by_key(|c| c.rank)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    fn sort(&mut self) {
        self.cards
            .sort_by(|a, b| a.suit.cmp(&b.suit).then(a.rank.cmp(&b.rank)));
    }
}
