//! Deck construction, shuffling and dealing.

use crate::card::{Card, JokerColor, Rank, Suit};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cards in a standard deck
pub const STANDARD_DECK_SIZE: usize = 52;

/// Cards assigned to one seat
pub type Hand = Vec<Card>;

/// Errors that can occur when dealing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("Cannot deal to zero hands")]
    NoHands,

    #[error("Need {needed} cards but the deck has {available}")]
    NotEnoughCards { needed: usize, available: usize },
}

/// The outcome of a deal: one hand per seat and whatever was left over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub hands: Vec<Hand>,
    /// Undealt cards (the kitty, in variants that use one)
    pub residual: Vec<Card>,
}

impl Deal {
    /// Total number of cards across hands and residual
    pub fn card_count(&self) -> usize {
        self.hands.iter().map(Vec::len).sum::<usize>() + self.residual.len()
    }
}

/// An ordered sequence of cards, top of the deck last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The 52 standard cards, suit-major (spades, hearts, diamonds, clubs)
    /// and rank-ascending within each suit
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(STANDARD_DECK_SIZE);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::standard(rank, suit));
            }
        }
        Self { cards }
    }

    /// The standard deck followed by the black and red jokers
    pub fn with_jokers() -> Self {
        let mut deck = Self::standard();
        deck.cards
            .extend(JokerColor::ALL.into_iter().map(Card::Joker));
        deck
    }

    /// A standard deck, already shuffled
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle(rng);
        deck
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Fisher-Yates: walk from the last index down to 1, swapping each
    /// position with a uniformly chosen index at or below it. One draw per
    /// swap.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in (1..self.cards.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.cards.swap(i, j);
        }
    }

    /// Take the top card
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Deal round-robin: card `i` goes to hand `i % hand_count` until every
    /// hand holds `hand_size` cards. The rest of the deck becomes the
    /// residual, in deck order.
    pub fn deal(self, hand_count: usize, hand_size: usize) -> Result<Deal, DeckError> {
        if hand_count == 0 {
            return Err(DeckError::NoHands);
        }
        let needed = hand_count.saturating_mul(hand_size);
        if needed > self.cards.len() {
            return Err(DeckError::NotEnoughCards {
                needed,
                available: self.cards.len(),
            });
        }

        let mut cards = self.cards;
        let residual = cards.split_off(needed);
        let mut hands: Vec<Hand> = (0..hand_count)
            .map(|_| Vec::with_capacity(hand_size))
            .collect();
        for (i, card) in cards.into_iter().enumerate() {
            hands[i % hand_count].push(card);
        }

        Ok(Deal { hands, residual })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_standard_deck() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), STANDARD_DECK_SIZE);

        let unique: HashSet<Card> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), STANDARD_DECK_SIZE);
        assert!(!deck.cards().iter().any(Card::is_joker));
    }

    #[test]
    fn test_canonical_order() {
        let deck = Deck::standard();
        assert_eq!(deck.cards()[0], Card::standard(Rank::Two, Suit::Spades));
        assert_eq!(deck.cards()[12], Card::standard(Rank::Ace, Suit::Spades));
        assert_eq!(deck.cards()[13], Card::standard(Rank::Two, Suit::Hearts));
        assert_eq!(deck.cards()[51], Card::standard(Rank::Ace, Suit::Clubs));
    }

    #[test]
    fn test_with_jokers() {
        let deck = Deck::with_jokers();
        assert_eq!(deck.len(), 54);
        assert_eq!(deck.cards()[52], Card::Joker(JokerColor::Black));
        assert_eq!(deck.cards()[53], Card::Joker(JokerColor::Red));
    }

    /// Counts how many times the shuffle asks for a random number
    struct CountingRng<R> {
        inner: R,
        draws: usize,
    }

    impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            self.inner.next_u32()
        }
        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            self.inner.next_u64()
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.draws += 1;
            self.inner.fill_bytes(dest)
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.draws += 1;
            self.inner.try_fill_bytes(dest)
        }
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::standard();
        deck.shuffle(&mut rng);

        assert_eq!(deck.len(), STANDARD_DECK_SIZE);
        let mut sorted = deck.clone().into_cards();
        sorted.sort();
        let mut expected = Deck::standard().into_cards();
        expected.sort();
        assert_eq!(sorted, expected);
        assert_ne!(deck, Deck::standard());
    }

    #[test]
    fn test_shuffle_is_deterministic_per_seed() {
        let a = Deck::shuffled(&mut StdRng::seed_from_u64(42));
        let b = Deck::shuffled(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_draws_at_least_once_per_swap() {
        let mut rng = CountingRng {
            inner: StdRng::seed_from_u64(1),
            draws: 0,
        };
        Deck::standard().shuffle(&mut rng);
        // gen_range may reject and redraw, never draw less
        assert!(rng.draws >= STANDARD_DECK_SIZE - 1);
    }

    #[test]
    fn test_shuffle_tiny_decks() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut empty = Deck::from_cards(vec![]);
        empty.shuffle(&mut rng);
        assert!(empty.is_empty());

        let single = Card::standard(Rank::Five, Suit::Hearts);
        let mut one = Deck::from_cards(vec![single]);
        one.shuffle(&mut rng);
        assert_eq!(one.cards(), &[single]);
    }

    #[test]
    fn test_deal_four_by_thirteen() {
        let deck = Deck::shuffled(&mut StdRng::seed_from_u64(11));
        let original = deck.clone();
        let deal = deck.deal(4, 13).unwrap();

        assert_eq!(deal.hands.len(), 4);
        assert!(deal.hands.iter().all(|h| h.len() == 13));
        assert!(deal.residual.is_empty());

        // round robin: position i lands in hand i % 4
        for (i, card) in original.cards().iter().enumerate() {
            assert_eq!(deal.hands[i % 4][i / 4], *card);
        }
    }

    #[test]
    fn test_deal_with_kitty() {
        let deal = Deck::with_jokers().deal(3, 17).unwrap();
        assert_eq!(deal.residual.len(), 3);
        assert_eq!(deal.card_count(), 54);
        assert_eq!(deal.residual[2], Card::Joker(JokerColor::Red));
    }

    #[test]
    fn test_deal_errors() {
        assert_eq!(Deck::standard().deal(0, 13), Err(DeckError::NoHands));
        assert_eq!(
            Deck::standard().deal(5, 13),
            Err(DeckError::NotEnoughCards {
                needed: 65,
                available: 52
            })
        );
    }

    #[test]
    fn test_draw() {
        let mut deck = Deck::standard();
        assert_eq!(deck.draw(), Some(Card::standard(Rank::Ace, Suit::Clubs)));
        assert_eq!(deck.len(), 51);
    }
}
