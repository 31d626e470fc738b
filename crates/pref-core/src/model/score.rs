use crate::model::bid::{Bid, Contract, Trump};
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

/// Explicit scoring constants. Preferans clubs disagree on these, so
/// they are configuration, not rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    /// Game price per level, 6 through 10.
    pub game_price: [i32; 5],
    pub misere_price: i32,
    /// Mountain points per trick taken in a pass round.
    pub pass_trick_price: i32,
    /// Tricks the defenders must jointly take against a made game,
    /// per level 6 through 10.
    pub required_whists: [u8; 5],
    /// Settlement value of one pool point.
    pub pool_value: i32,
    /// Settlement value of one mountain point.
    pub mountain_value: i32,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            game_price: [2, 4, 6, 8, 10],
            misere_price: 10,
            pass_trick_price: 1,
            required_whists: [4, 2, 1, 1, 0],
            pool_value: 10,
            mountain_value: 10,
        }
    }
}

impl ScoreTable {
    fn level_index(level: u8) -> usize {
        usize::from(level.saturating_sub(6)).min(4)
    }

    pub fn price(&self, level: u8) -> i32 {
        self.game_price[Self::level_index(level)]
    }

    pub fn required_whist_tricks(&self, level: u8, ten_whist: bool) -> u8 {
        let required = self.required_whists[Self::level_index(level)];
        if level == 10 {
            if ten_whist { required.max(1) } else { required }
        } else {
            required
        }
    }
}

/// Match conventions, mirroring the classic new-game dialog options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Pool threshold that ends the match once any player reaches it.
    pub max_pool: i32,
    pub max_rounds: Option<u32>,
    /// Full whist responsibility; when off, shortfall penalties are
    /// halved ("gentleman's whist"). Penalties are integer whist
    /// points, so halving can truncate: a one-trick shortfall on the
    /// two-point game waives the penalty entirely.
    pub whist_greedy: bool,
    /// Whist obligations also apply to ten-level games.
    pub ten_whist: bool,
    /// Compulsory whist on the minimum game: shortfalls are doubled.
    pub stalingrad: bool,
    /// Consecutive pass rounds escalate: the pass-trick price doubles
    /// and the minimum opening bid rises one ladder step per streak.
    pub aggressive_pass: bool,
    /// Removes the six-level games from the ladder and scores failed
    /// contracts as at least three undertricks.
    pub without_three: bool,
    pub table: ScoreTable,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            max_pool: 10,
            max_rounds: None,
            whist_greedy: true,
            ten_whist: false,
            stalingrad: false,
            aggressive_pass: false,
            without_three: false,
            table: ScoreTable::default(),
        }
    }
}

impl RuleConfig {
    /// Minimum opening bid rank for the next auction.
    pub fn auction_floor(&self, pass_round_streak: u32) -> u8 {
        let mut floor = if self.without_three {
            const SEVEN_SPADES: Bid = Bid::Game {
                level: 7,
                trump: Trump::Suit(Suit::Spades),
            };
            SEVEN_SPADES.ladder_rank()
        } else {
            Bid::MINIMUM.ladder_rank()
        };
        if self.aggressive_pass {
            floor = floor.saturating_add(pass_round_streak.min(20) as u8);
        }
        floor
    }
}

/// Everything round scoring depends on. Play order and the specific
/// cards are irrelevant once the trick counts are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub contract: Option<Contract>,
    pub tricks: [u8; 3],
    /// Consecutive pass rounds preceding this one.
    pub pass_round_streak: u32,
}

/// Score deltas for one round. `whists[i][j]` is whist points seat `i`
/// earned against seat `j`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScore {
    pub pool: [i32; 3],
    pub mountain: [i32; 3],
    pub whists: [[i32; 3]; 3],
}

pub fn score_round(result: &RoundResult, config: &RuleConfig) -> RoundScore {
    let mut score = RoundScore::default();
    let table = &config.table;

    let Some(contract) = result.contract else {
        // Pass round: every trick goes onto the mountain, escalating
        // with the streak under aggressive pass; a clean sheet earns a
        // pool point.
        let multiplier = if config.aggressive_pass {
            1 << result.pass_round_streak.min(8)
        } else {
            1
        };
        for seat in Seat::LOOP.iter().copied() {
            let taken = i32::from(result.tricks[seat.index()]);
            if taken == 0 {
                score.pool[seat.index()] += 1;
            } else {
                score.mountain[seat.index()] += taken * table.pass_trick_price * multiplier;
            }
        }
        return score;
    };

    let declarer = contract.declarer;
    let taken = i32::from(result.tricks[declarer.index()]);

    match contract.bid {
        Bid::Misere => {
            if taken == 0 {
                score.pool[declarer.index()] += table.misere_price;
            } else {
                score.mountain[declarer.index()] += taken * table.misere_price;
                for seat in Seat::LOOP.iter().copied().filter(|s| *s != declarer) {
                    score.whists[seat.index()][declarer.index()] += taken * table.misere_price;
                }
            }
        }
        Bid::Game { level, .. } => {
            let price = table.price(level);
            let goal = i32::from(level);

            if taken >= goal {
                score.pool[declarer.index()] += price;
            } else {
                let mut shortfall = goal - taken;
                if config.without_three {
                    shortfall = shortfall.max(3);
                }
                score.mountain[declarer.index()] += shortfall * price;
            }

            // Defenders earn whists for their own tricks at the game
            // price.
            for seat in Seat::LOOP.iter().copied().filter(|s| *s != declarer) {
                score.whists[seat.index()][declarer.index()] +=
                    i32::from(result.tricks[seat.index()]) * price;
            }

            // Whist obligation applies only against a made game.
            if taken >= goal {
                let required =
                    i32::from(table.required_whist_tricks(level, config.ten_whist));
                let defended = 10 - taken;
                if defended < required {
                    let missing = required - defended;
                    let mut penalty = missing * price / 2;
                    if !config.whist_greedy {
                        penalty /= 2;
                    }
                    if config.stalingrad && contract.bid == Bid::MINIMUM {
                        penalty *= 2;
                    }
                    for seat in Seat::LOOP.iter().copied().filter(|s| *s != declarer) {
                        score.mountain[seat.index()] += penalty;
                    }
                }
            }
        }
    }

    score
}

/// Cumulative pool/mountain/whist ledger for the match. Deltas are
/// applied exactly once per round and never retroactively mutated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pool: [i32; 3],
    mountain: [i32; 3],
    whists: [[i32; 3]; 3],
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, score: &RoundScore) {
        for i in 0..3 {
            self.pool[i] += score.pool[i];
            self.mountain[i] += score.mountain[i];
            for j in 0..3 {
                self.whists[i][j] += score.whists[i][j];
            }
        }
    }

    pub fn pool(&self, seat: Seat) -> i32 {
        self.pool[seat.index()]
    }

    pub fn mountain(&self, seat: Seat) -> i32 {
        self.mountain[seat.index()]
    }

    pub fn whists(&self, seat: Seat, against: Seat) -> i32 {
        self.whists[seat.index()][against.index()]
    }

    pub fn pool_filled(&self, limit: i32) -> Option<Seat> {
        Seat::LOOP
            .iter()
            .copied()
            .find(|seat| self.pool[seat.index()] >= limit)
    }

    /// Nets the three columns into per-seat standings: pool credits,
    /// mountain debits, and pairwise whist differences.
    pub fn totals(&self, table: &ScoreTable) -> [i32; 3] {
        let mut totals = [0i32; 3];
        for i in 0..3 {
            totals[i] += self.pool[i] * table.pool_value;
            totals[i] -= self.mountain[i] * table.mountain_value;
            for j in 0..3 {
                totals[i] += self.whists[i][j] - self.whists[j][i];
            }
        }
        totals
    }
}
