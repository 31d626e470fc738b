use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const DECK_SIZE: usize = 32;
pub const HAND_SIZE: usize = 10;
pub const TALON_SIZE: usize = 2;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Deals ten cards to each of the three seats, round-robin, leaving
    /// the last two cards as the talon. The hands and talon always
    /// partition the deck.
    pub fn deal(&self) -> ([Hand; 3], [Card; 2]) {
        let mut dealt: [Vec<Card>; 3] = [
            Vec::with_capacity(HAND_SIZE),
            Vec::with_capacity(HAND_SIZE),
            Vec::with_capacity(HAND_SIZE),
        ];
        for (index, card) in self.cards.iter().take(3 * HAND_SIZE).enumerate() {
            dealt[index % 3].push(*card);
        }
        let talon = [self.cards[3 * HAND_SIZE], self.cards[3 * HAND_SIZE + 1]];
        let [south, west, east] = dealt;
        (
            [
                Hand::with_cards(south),
                Hand::with_cards(west),
                Hand::with_cards(east),
            ],
            talon,
        )
    }
}
