// Player points and price.
//
// Points reward batting (strike rate and average) and bowling (strike rate
// and economy). Value converts points into a price rounded to the nearest
// 50,000. Every function here is total: zero denominators yield a zero
// rate, bad counters are treated as zero and results that would overflow are
// capped at `f64::MAX`, so nothing can panic or return NaN or infinity.

use crease_core::model::PlayerStats;

/// Prices are multiples of this step.
pub const VALUE_STEP: f64 = 50_000.0;

/// Highest price the formula can produce: the largest multiple of
/// `VALUE_STEP` that fits in a `u64`.
pub const MAX_VALUE: u64 = u64::MAX - u64::MAX % VALUE_STEP as u64;

// ---------------------------------------------------------------------------
// Derived rates
// ---------------------------------------------------------------------------

/// Clamp a counter to a usable, non-negative, finite number.
fn sanitize(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Keep a derived figure finite: overflow becomes `f64::MAX`, NaN becomes 0.
fn cap(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, f64::MAX)
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        cap(numerator / denominator)
    } else {
        0.0
    }
}

/// Runs per 100 balls faced.
pub fn batting_strike_rate(stats: &PlayerStats) -> f64 {
    cap(ratio(sanitize(stats.total_runs), sanitize(stats.balls_faced)) * 100.0)
}

/// Runs per innings.
pub fn batting_average(stats: &PlayerStats) -> f64 {
    ratio(sanitize(stats.total_runs), sanitize(stats.innings_played))
}

pub fn balls_bowled(stats: &PlayerStats) -> f64 {
    cap(sanitize(stats.overs_bowled) * 6.0)
}

/// Balls bowled per wicket.
pub fn bowling_strike_rate(stats: &PlayerStats) -> f64 {
    ratio(balls_bowled(stats), sanitize(stats.wickets))
}

/// Runs conceded per over (six balls).
pub fn economy_rate(stats: &PlayerStats) -> f64 {
    cap(ratio(sanitize(stats.runs_conceded), balls_bowled(stats)) * 6.0)
}

// ---------------------------------------------------------------------------
// Points and value
// ---------------------------------------------------------------------------

/// Round to two decimals. Magnitudes too large to scale are already whole.
fn round_2dp(x: f64) -> f64 {
    let scaled = x * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        x
    }
}

/// Fantasy points, rounded to two decimals.
pub fn points(stats: &PlayerStats) -> f64 {
    let strike_rate = batting_strike_rate(stats);
    let average = batting_average(stats);
    let bowling_sr = bowling_strike_rate(stats);
    let economy = economy_rate(stats);

    let mut total = 0.0;

    if strike_rate > 0.0 || average > 0.0 {
        total = cap(total + strike_rate / 5.0 + average * 0.8);
    }

    if bowling_sr > 0.0 || economy > 0.0 {
        let sr_part = if bowling_sr > 0.0 { cap(500.0 / bowling_sr) } else { 0.0 };
        let econ_part = if economy > 0.0 { cap(140.0 / economy) } else { 0.0 };
        total = cap(total + sr_part + econ_part);
    }

    round_2dp(total)
}

/// Price for a given points score, rounded to the nearest `VALUE_STEP` and
/// saturating at `MAX_VALUE`.
pub fn value_from_points(points: f64) -> u64 {
    let points = cap(points);
    let raw = cap((9.0 * points + 100.0) * 1000.0);
    let steps = (raw / VALUE_STEP).round();
    if steps >= (MAX_VALUE / VALUE_STEP as u64) as f64 {
        return MAX_VALUE;
    }
    (steps as u64).saturating_mul(VALUE_STEP as u64).min(MAX_VALUE)
}

/// Price of a player.
pub fn value(stats: &PlayerStats) -> u64 {
    value_from_points(points(stats))
}

// ---------------------------------------------------------------------------
// Valuation breakdown
// ---------------------------------------------------------------------------

/// Every derived figure for one player, as shown in the detail view and by
/// `crease value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub batting_strike_rate: f64,
    pub batting_average: f64,
    pub bowling_strike_rate: f64,
    pub economy_rate: f64,
    pub points: f64,
    pub value: u64,
}

impl Valuation {
    pub fn of(stats: &PlayerStats) -> Self {
        let points = points(stats);
        Valuation {
            batting_strike_rate: batting_strike_rate(stats),
            batting_average: batting_average(stats),
            bowling_strike_rate: bowling_strike_rate(stats),
            economy_rate: economy_rate(stats),
            points,
            value: value_from_points(points),
        }
    }
}

// ---------------------------------------------------------------------------
// Currency formatting
// ---------------------------------------------------------------------------

/// Render an amount the way the portal shows prices: `RS` followed by
/// Indian digit grouping (last three digits, then pairs), e.g. `RS90,00,000`.
pub fn format_currency(amount: u64) -> String {
    format!("RS{}", group_indian(amount))
}

/// Like `format_currency` but for signed amounts such as an over-spent
/// budget.
pub fn format_signed_currency(amount: i64) -> String {
    let grouped = group_indian(amount.unsigned_abs());
    if amount < 0 {
        format!("-RS{grouped}")
    } else {
        format!("RS{grouped}")
    }
}

fn group_indian(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(runs: f64, balls: f64, innings: f64, wickets: f64, overs: f64, conceded: f64) -> PlayerStats {
        PlayerStats {
            total_runs: runs,
            balls_faced: balls,
            innings_played: innings,
            wickets,
            overs_bowled: overs,
            runs_conceded: conceded,
        }
    }

    #[test]
    fn zero_counters_are_worth_the_floor() {
        let s = PlayerStats::default();
        assert_eq!(points(&s), 0.0);
        assert_eq!(value(&s), 100_000);
        let v = Valuation::of(&s);
        assert_eq!(v.batting_strike_rate, 0.0);
        assert_eq!(v.economy_rate, 0.0);
    }

    #[test]
    fn pure_batsman_example() {
        let s = stats(500.0, 400.0, 10.0, 0.0, 0.0, 0.0);
        assert_eq!(batting_strike_rate(&s), 125.0);
        assert_eq!(batting_average(&s), 50.0);
        assert_eq!(points(&s), 65.0);
        assert_eq!(value(&s), 700_000);
    }

    #[test]
    fn bowling_component() {
        // 40 overs, 20 wickets, 240 conceded: SR 12, economy 6.
        let s = stats(0.0, 0.0, 0.0, 20.0, 40.0, 240.0);
        assert_eq!(bowling_strike_rate(&s), 12.0);
        assert_eq!(economy_rate(&s), 6.0);
        // 500/12 + 140/6 = 41.666.. + 23.333.. = 65.0
        assert_eq!(points(&s), 65.0);
        assert_eq!(value(&s), 700_000);
    }

    #[test]
    fn overs_without_wickets_still_score_economy() {
        let s = stats(0.0, 0.0, 0.0, 0.0, 12.0, 72.0);
        assert_eq!(bowling_strike_rate(&s), 0.0);
        assert_eq!(economy_rate(&s), 6.0);
        assert_eq!(points(&s), 23.33);
    }

    #[test]
    fn points_round_to_two_decimals() {
        // SR = 100/3*100 = 3333.33.., average = 100/3 = 33.33..
        let s = stats(100.0, 3.0, 3.0, 0.0, 0.0, 0.0);
        let p = points(&s);
        assert_eq!(p, (p * 100.0).round() / 100.0);
    }

    #[test]
    fn bad_counters_are_treated_as_zero() {
        let s = stats(f64::NAN, -4.0, f64::INFINITY, -1.0, f64::NEG_INFINITY, f64::NAN);
        assert_eq!(points(&s), 0.0);
        assert_eq!(value(&s), 100_000);
    }

    #[test]
    fn results_are_finite_and_non_negative() {
        let samples = [0.0, 0.1, 1.0, 6.0, 49.5, 1_000.0, 1e9];
        for &a in &samples {
            for &b in &samples {
                let s = stats(a, b, b, a, b, a);
                let v = Valuation::of(&s);
                assert!(v.points.is_finite() && v.points >= 0.0, "{s:?}");
                assert!(v.batting_strike_rate.is_finite());
                assert!(v.bowling_strike_rate.is_finite());
                assert!(v.economy_rate.is_finite());
                assert_eq!(v.value % 50_000, 0);
                assert!(v.value >= 100_000);
                assert_eq!(Valuation::of(&s), v);
            }
        }
    }

    #[test]
    fn extreme_magnitudes_stay_finite() {
        let samples = [1e-300, 0.5, 1.0, 1e300, f64::MAX];
        for &a in &samples {
            for &b in &samples {
                let s = stats(a, b, b, b, a, a);
                let v = Valuation::of(&s);
                for x in [
                    v.batting_strike_rate,
                    v.batting_average,
                    v.bowling_strike_rate,
                    v.economy_rate,
                    v.points,
                ] {
                    assert!(x.is_finite() && x >= 0.0, "{s:?} -> {v:?}");
                }
                assert_eq!(v.value % 50_000, 0);
                assert!(v.value >= 100_000);
            }
        }
    }

    #[test]
    fn overwhelming_batsman_is_priced_at_the_ceiling() {
        let s = stats(1e308, 0.5, 1.0, 0.0, 0.0, 0.0);
        let p = points(&s);
        assert!(p.is_finite() && p > 1e300);
        assert_eq!(value(&s), MAX_VALUE);

        let s = stats(1e20, 1.0, 1.0, 0.0, 0.0, 0.0);
        assert_eq!(value(&s), MAX_VALUE);
    }

    #[test]
    fn value_saturates_and_stays_on_step() {
        assert_eq!(MAX_VALUE % 50_000, 0);
        assert_eq!(value_from_points(f64::INFINITY), MAX_VALUE);
        assert_eq!(value_from_points(f64::MAX), MAX_VALUE);
        assert_eq!(value_from_points(f64::NAN), 100_000);
        // 1e12 points -> 9e15 + 100,000: exact in u64.
        assert_eq!(value_from_points(1e12), 9_000_000_000_100_000);
    }

    #[test]
    fn value_rounds_to_nearest_step() {
        // (9*1 + 100) * 1000 = 109,000 -> 100,000
        assert_eq!(value_from_points(1.0), 100_000);
        // (9*3 + 100) * 1000 = 127,000 -> 150,000
        assert_eq!(value_from_points(3.0), 150_000);
        assert_eq!(value_from_points(-5.0), 100_000);
    }

    #[test]
    fn currency_uses_indian_grouping() {
        assert_eq!(format_currency(0), "RS0");
        assert_eq!(format_currency(950), "RS950");
        assert_eq!(format_currency(1_000), "RS1,000");
        assert_eq!(format_currency(700_000), "RS7,00,000");
        assert_eq!(format_currency(9_000_000), "RS90,00,000");
        assert_eq!(format_currency(123_456_789), "RS12,34,56,789");
    }

    #[test]
    fn signed_currency() {
        assert_eq!(format_signed_currency(-150_000), "-RS1,50,000");
        assert_eq!(format_signed_currency(8_300_000), "RS83,00,000");
    }
}
