//! Mana colours, pool contents, and the payment heuristics shared by the
//! indexer and the default resolver.
use crate::ids::ObjectId;
use crate::snapshot::{GameSnapshot, PlayableObject};

/// Marker the engine puts in front of every mana ability text.
const MANA_ABILITY_MARKER: &str = "{T}: Add ";

/// Marker embedded in payment prompts naming the object being paid for.
const PAYING_FOR_MARKER: &str = "object_id='";

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ManaColor {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl ManaColor {
    /// Colours in WUBRGC order.
    pub const ALL: [ManaColor; 6] = [
        ManaColor::White,
        ManaColor::Blue,
        ManaColor::Black,
        ManaColor::Red,
        ManaColor::Green,
        ManaColor::Colorless,
    ];

    pub const fn symbol(self) -> &'static str {
        match self {
            ManaColor::White => "{W}",
            ManaColor::Blue => "{U}",
            ManaColor::Black => "{B}",
            ManaColor::Red => "{R}",
            ManaColor::Green => "{G}",
            ManaColor::Colorless => "{C}",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ManaColor::White => "White",
            ManaColor::Blue => "Blue",
            ManaColor::Black => "Black",
            ManaColor::Red => "Red",
            ManaColor::Green => "Green",
            ManaColor::Colorless => "Colorless",
        }
    }
}

/// Floating mana a player holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManaPool {
    pub white: u32,
    pub blue: u32,
    pub black: u32,
    pub red: u32,
    pub green: u32,
    pub colorless: u32,
}

impl ManaPool {
    pub fn get(&self, color: ManaColor) -> u32 {
        match color {
            ManaColor::White => self.white,
            ManaColor::Blue => self.blue,
            ManaColor::Black => self.black,
            ManaColor::Red => self.red,
            ManaColor::Green => self.green,
            ManaColor::Colorless => self.colorless,
        }
    }

    pub fn with(mut self, color: ManaColor, amount: u32) -> Self {
        let slot = match color {
            ManaColor::White => &mut self.white,
            ManaColor::Blue => &mut self.blue,
            ManaColor::Black => &mut self.black,
            ManaColor::Red => &mut self.red,
            ManaColor::Green => &mut self.green,
            ManaColor::Colorless => &mut self.colorless,
        };
        *slot = amount;
        self
    }

    pub fn is_empty(&self) -> bool {
        ManaColor::ALL.iter().all(|c| self.get(*c) == 0)
    }

    /// Colours with a positive count, in WUBRGC order.
    pub fn available(&self) -> Vec<(ManaColor, u32)> {
        ManaColor::ALL
            .iter()
            .map(|c| (*c, self.get(*c)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

pub fn is_mana_ability(text: &str) -> bool {
    text.contains(MANA_ABILITY_MARKER)
}

/// True when every ability of the object only produces mana.
pub fn is_mana_only(abilities: &[String]) -> bool {
    !abilities.is_empty() && abilities.iter().all(|a| is_mana_ability(a))
}

/// Extracts the object being paid for from a payment prompt.
pub fn paying_for(prompt: &str) -> Option<ObjectId> {
    let start = prompt.find(PAYING_FOR_MARKER)? + PAYING_FOR_MARKER.len();
    let rest = &prompt[start..];
    let end = rest.find('\'')?;
    rest[..end].parse().ok()
}

/// Colours whose symbol appears in the prompt, in either case.
pub fn explicit_symbols(prompt: &str) -> Vec<ManaColor> {
    let prompt = prompt.to_ascii_uppercase();
    ManaColor::ALL
        .iter()
        .copied()
        .filter(|c| prompt.contains(c.symbol()))
        .collect()
}

/// Pool colours offered for a payment prompt.
///
/// Explicit symbols restrict the offer to those colours; otherwise every
/// colour with a positive count is offered.
pub fn pool_choices(pool: &ManaPool, prompt: &str) -> Vec<(ManaColor, u32)> {
    let explicit = explicit_symbols(prompt);
    pool.available()
        .into_iter()
        .filter(|(c, _)| explicit.is_empty() || explicit.contains(c))
        .collect()
}

/// Playable objects with a mana ability, skipping the object being paid for.
pub fn tap_sources<'a>(
    snapshot: &'a GameSnapshot,
    exclude: Option<ObjectId>,
) -> impl Iterator<Item = &'a PlayableObject> + 'a {
    snapshot
        .playable
        .iter()
        .filter(move |obj| Some(obj.id) != exclude)
        .filter(|obj| obj.abilities.iter().any(|a| is_mana_ability(a)))
}

/// What an automatic payment would do for a mana prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManaPlan {
    /// Activate the mana ability of the first tappable source.
    Tap(ObjectId),
    /// Spend one colour from the pool.
    Spend(ManaColor),
    /// Several pool colours fit and the prompt names none of them.
    Ambiguous(Vec<ManaColor>),
    /// No source and no usable pool mana.
    Unavailable { paying_for: Option<ObjectId> },
}

pub fn plan_payment(prompt: &str, snapshot: &GameSnapshot) -> ManaPlan {
    let target = paying_for(prompt);

    if let Some(source) = tap_sources(snapshot, target).next() {
        return ManaPlan::Tap(source.id);
    }

    let pool = snapshot.me().map(|p| p.mana_pool).unwrap_or_default();
    let choices = pool_choices(&pool, prompt);
    let explicit = !explicit_symbols(prompt).is_empty();

    match choices.as_slice() {
        [] => ManaPlan::Unavailable { paying_for: target },
        [(color, _)] => ManaPlan::Spend(*color),
        [(color, _), ..] if explicit => ManaPlan::Spend(*color),
        many => ManaPlan::Ambiguous(many.iter().map(|(c, _)| *c).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PlayerId;
    use crate::snapshot::PlayerView;

    fn snapshot_with_pool(pool: ManaPool) -> GameSnapshot {
        let me = PlayerId::random();
        let mut player = PlayerView::new(me, "Alice", 20);
        player.mana_pool = pool;
        GameSnapshot {
            my_player_id: Some(me),
            players: vec![player],
            ..GameSnapshot::default()
        }
    }

    #[test]
    fn test_paying_for_extracts_object() {
        let id = ObjectId::random();
        let prompt = format!("Pay {{1}}{{G}} for object_id='{id}' (Grizzly Bears)");
        assert_eq!(paying_for(&prompt), Some(id));
        assert_eq!(paying_for("Pay {1}"), None);
        assert_eq!(paying_for("object_id='broken"), None);
    }

    #[test]
    fn test_pool_choices_respect_explicit_symbols() {
        let pool = ManaPool::default()
            .with(ManaColor::Green, 2)
            .with(ManaColor::Red, 1);
        assert_eq!(
            pool_choices(&pool, "Pay {1}"),
            vec![(ManaColor::Red, 1), (ManaColor::Green, 2)]
        );
        assert_eq!(
            pool_choices(&pool, "Pay {G}"),
            vec![(ManaColor::Green, 2)]
        );
        assert!(pool_choices(&pool, "Pay {U}").is_empty());
    }

    #[test]
    fn test_explicit_symbols_ignore_case() {
        assert_eq!(explicit_symbols("pay {g}{r}"), vec![ManaColor::Red, ManaColor::Green]);
        let pool = ManaPool::default()
            .with(ManaColor::Green, 1)
            .with(ManaColor::Red, 1);
        assert_eq!(pool_choices(&pool, "Pay {r}"), vec![(ManaColor::Red, 1)]);
    }

    #[test]
    fn test_mana_only_detection() {
        let tap = vec!["{T}: Add {G}.".to_string()];
        let mixed = vec![
            "{T}: Add {G}.".to_string(),
            "{2}, {T}: Draw a card.".to_string(),
        ];
        assert!(is_mana_only(&tap));
        assert!(!is_mana_only(&mixed));
        assert!(!is_mana_only(&[]));
    }

    #[test]
    fn test_plan_prefers_tap_source_over_pool() {
        let mut snapshot = snapshot_with_pool(ManaPool::default().with(ManaColor::Green, 1));
        let forest = ObjectId::random();
        snapshot.playable.push(PlayableObject::new(forest, ["{T}: Add {G}."]));
        assert_eq!(plan_payment("Pay {1}", &snapshot), ManaPlan::Tap(forest));
    }

    #[test]
    fn test_plan_skips_object_being_paid_for() {
        let mut snapshot = snapshot_with_pool(ManaPool::default());
        let elf = ObjectId::random();
        snapshot.playable.push(PlayableObject::new(elf, ["{T}: Add {G}."]));
        let prompt = format!("Pay {{G}} object_id='{elf}'");
        assert_eq!(
            plan_payment(&prompt, &snapshot),
            ManaPlan::Unavailable {
                paying_for: Some(elf)
            }
        );
    }

    #[test]
    fn test_plan_pool_single_and_ambiguous() {
        let one = snapshot_with_pool(ManaPool::default().with(ManaColor::Green, 1));
        assert_eq!(
            plan_payment("Pay {1}", &one),
            ManaPlan::Spend(ManaColor::Green)
        );

        let two = snapshot_with_pool(
            ManaPool::default()
                .with(ManaColor::Green, 1)
                .with(ManaColor::Red, 1),
        );
        assert_eq!(
            plan_payment("Pay {1}", &two),
            ManaPlan::Ambiguous(vec![ManaColor::Red, ManaColor::Green])
        );
        assert_eq!(
            plan_payment("Pay {R}", &two),
            ManaPlan::Spend(ManaColor::Red)
        );
    }
}
