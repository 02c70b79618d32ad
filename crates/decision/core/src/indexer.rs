//! Choice Indexer: enumerates the legal answers of a pending decision and
//! translates index-based answers back into engine answers.
//!
//! Enumeration is deterministic. It iterates payload and snapshot collections
//! in the order the engine delivered them. Descriptions name cards by what a
//! player sees (name, cost, power/toughness, tapped state); engine ids only
//! live in the hidden answer of each [`Choice`].
//!
//! [`Choice`]: crate::choice::Choice
use crate::answer::EngineAnswer;
use crate::choice::{
    AmountItemView, ChoiceDetail, ChoiceInput, ChoiceKind, ChoiceList, ChoicesView, HandCard,
    HiddenAnswer, MulliganInfo, PhaseContext, ResponseType,
};
use crate::decision::{Decision, DecisionKind, MultiAmountRequest, PendingAction, TargetRequest};
use crate::error::ChoiceError;
use crate::ids::ObjectId;
use crate::mana::{self, is_mana_ability, is_mana_only};
use crate::payment::FailedPaymentSet;
use crate::snapshot::{CardView, GameSnapshot, Zone};

/// Builds the agent-facing view and the matching choice list.
pub fn build(
    pending: &PendingAction,
    snapshot: &GameSnapshot,
    failed: &FailedPaymentSet,
) -> (ChoicesView, ChoiceList) {
    let mut list = ChoiceList::new(pending.id);
    let mut detail = ChoiceDetail::default();

    let response_type = match &pending.decision {
        Decision::Ask => {
            if pending.prompt.to_ascii_lowercase().contains("mulligan") {
                detail.mulligan = Some(mulligan_info(snapshot));
            }
            ResponseType::Boolean
        }
        Decision::Select => {
            enumerate_playable(snapshot, failed, &mut list);
            if list.is_empty() {
                detail.hint = Some("Nothing playable. Answer false to pass priority.".into());
                ResponseType::Boolean
            } else {
                detail.hint = Some("Pick an index to play it, or answer false to pass.".into());
                ResponseType::Select
            }
        }
        Decision::Target(request) => {
            enumerate_targets(request, snapshot, &mut list);
            detail.required = Some(request.required);
            detail.can_cancel = Some(true);
            ResponseType::Index
        }
        Decision::ChooseAbility { options } => {
            for option in options {
                list.push(
                    option.label.clone(),
                    ChoiceKind::Ability,
                    HiddenAnswer::Object(option.id),
                );
            }
            ResponseType::Index
        }
        Decision::ChooseChoice { options } => {
            for option in options {
                list.push(
                    option.label.clone(),
                    ChoiceKind::Option,
                    HiddenAnswer::Text(option.answer().to_string()),
                );
            }
            ResponseType::Index
        }
        Decision::ChoosePile { pile1, pile2 } => {
            detail.pile1 = Some(pile1.iter().map(|c| c.name.clone()).collect());
            detail.pile2 = Some(pile2.iter().map(|c| c.name.clone()).collect());
            ResponseType::Pile
        }
        Decision::PlayMana | Decision::PlayXMana => {
            let target = mana::paying_for(&pending.prompt);
            detail.paying_for = target
                .and_then(|id| snapshot.find_card(id))
                .map(|(card, _)| card.name.clone());
            enumerate_mana(&pending.prompt, target, snapshot, &mut list);
            detail.hint = Some("Pick a mana source, or answer false to cancel.".into());
            ResponseType::Select
        }
        Decision::GetAmount { min, max } => {
            detail.min = Some(*min);
            detail.max = Some(*max);
            ResponseType::Amount
        }
        Decision::GetMultiAmount(request) => {
            detail.total_min = Some(request.total_min);
            detail.total_max = Some(request.total_max);
            detail.items = Some(
                request
                    .items
                    .iter()
                    .map(|item| AmountItemView {
                        description: item.label.clone(),
                        min: item.min,
                        max: item.max,
                        default: item.default,
                    })
                    .collect(),
            );
            ResponseType::MultiAmount
        }
    };

    let view = ChoicesView {
        decision_id: pending.id,
        action_type: pending.kind(),
        message: pending.prompt.clone(),
        response_type,
        context: PhaseContext::from_snapshot(snapshot),
        choices: list.choices().to_vec(),
        detail,
    };
    (view, list)
}

/// Validates caller input against the pending decision and the choice list
/// built for it.
///
/// Never consumes anything: on error the decision stays pending.
pub fn resolve(
    pending: &PendingAction,
    list: Option<&ChoiceList>,
    input: &ChoiceInput,
    snapshot: &GameSnapshot,
) -> Result<EngineAnswer, ChoiceError> {
    let kind = pending.kind();
    let current = list.filter(|l| l.decision() == pending.id);

    match &pending.decision {
        Decision::Ask => input
            .answer
            .map(EngineAnswer::Boolean)
            .ok_or(ChoiceError::MissingField {
                field: "answer",
                kind,
            }),
        Decision::Select => match (input.index, input.answer) {
            (Some(index), _) => object_answer(pick(current, index)?, kind),
            (None, Some(answer)) => Ok(EngineAnswer::Boolean(answer)),
            (None, None) => Err(ChoiceError::MissingField {
                field: "index or answer",
                kind,
            }),
        },
        Decision::PlayMana | Decision::PlayXMana => match (input.answer, input.index) {
            (Some(false), _) => Ok(EngineAnswer::Boolean(false)),
            (Some(true), None) => Err(ChoiceError::WrongAnswerType {
                kind,
                provided: "answer=true",
            }),
            (_, Some(index)) => match pick(current, index)? {
                HiddenAnswer::Object(id) => Ok(EngineAnswer::Object(Some(*id))),
                HiddenAnswer::Pool(color) => {
                    let player = snapshot.my_player_id.ok_or(ChoiceError::UnknownPlayer)?;
                    Ok(EngineAnswer::PoolMana {
                        player,
                        mana: *color,
                    })
                }
                HiddenAnswer::Text(_) => Err(ChoiceError::WrongAnswerType {
                    kind,
                    provided: "text choice",
                }),
            },
            (None, None) => Err(ChoiceError::MissingField {
                field: "index or answer",
                kind,
            }),
        },
        Decision::Target(_) => match (input.answer, input.index) {
            (Some(false), _) => Ok(EngineAnswer::Boolean(false)),
            (_, Some(index)) => object_answer(pick(current, index)?, kind),
            (Some(true), None) => Err(ChoiceError::WrongAnswerType {
                kind,
                provided: "answer=true",
            }),
            (None, None) => Err(ChoiceError::MissingField {
                field: "index",
                kind,
            }),
        },
        Decision::ChooseAbility { .. } => {
            let index = input.index.ok_or(ChoiceError::MissingField {
                field: "index",
                kind,
            })?;
            object_answer(pick(current, index)?, kind)
        }
        Decision::ChooseChoice { .. } => {
            let index = input.index.ok_or(ChoiceError::MissingField {
                field: "index",
                kind,
            })?;
            match pick(current, index)? {
                HiddenAnswer::Text(text) => Ok(EngineAnswer::Text(Some(text.clone()))),
                _ => Err(ChoiceError::WrongAnswerType {
                    kind,
                    provided: "non-text choice",
                }),
            }
        }
        Decision::ChoosePile { .. } => match input.pile {
            Some(1) => Ok(EngineAnswer::Boolean(true)),
            Some(2) => Ok(EngineAnswer::Boolean(false)),
            Some(other) => Err(ChoiceError::InvalidPile(other)),
            None => Err(ChoiceError::MissingField {
                field: "pile",
                kind,
            }),
        },
        Decision::GetAmount { min, max } => {
            let amount = input.amount.ok_or(ChoiceError::MissingField {
                field: "amount",
                kind,
            })?;
            Ok(EngineAnswer::Integer(amount.clamp(*min, (*max).max(*min))))
        }
        Decision::GetMultiAmount(request) => {
            let amounts = input.amounts.as_ref().ok_or(ChoiceError::MissingField {
                field: "amounts",
                kind,
            })?;
            validate_amounts(request, amounts)?;
            Ok(EngineAnswer::Amounts(amounts.clone()))
        }
    }
}

fn pick(list: Option<&ChoiceList>, index: i64) -> Result<&HiddenAnswer, ChoiceError> {
    let list = list.ok_or(ChoiceError::NoChoiceList)?;
    Ok(&list.get(index)?.answer)
}

fn object_answer(answer: &HiddenAnswer, kind: DecisionKind) -> Result<EngineAnswer, ChoiceError> {
    match answer {
        HiddenAnswer::Object(id) => Ok(EngineAnswer::Object(Some(*id))),
        _ => Err(ChoiceError::WrongAnswerType {
            kind,
            provided: "non-object choice",
        }),
    }
}

fn validate_amounts(request: &MultiAmountRequest, amounts: &[i32]) -> Result<(), ChoiceError> {
    if amounts.len() != request.items.len() {
        return Err(ChoiceError::AmountCount {
            expected: request.items.len(),
            provided: amounts.len(),
        });
    }
    for (item, value) in request.items.iter().zip(amounts) {
        if *value < item.min || *value > item.max {
            return Err(ChoiceError::AmountOutOfBounds {
                label: item.label.clone(),
                value: *value,
                min: item.min,
                max: item.max,
            });
        }
    }
    let total: i32 = amounts.iter().sum();
    if total < request.total_min || total > request.total_max {
        return Err(ChoiceError::TotalOutOfBounds {
            total,
            min: request.total_min,
            max: request.total_max,
        });
    }
    Ok(())
}

fn enumerate_playable(snapshot: &GameSnapshot, failed: &FailedPaymentSet, list: &mut ChoiceList) {
    for object in &snapshot.playable {
        if failed.contains(object.id) || is_mana_only(&object.abilities) {
            continue;
        }
        let (description, kind) = match snapshot.find_card(object.id) {
            Some((card, Zone::Battlefield)) => {
                let abilities: Vec<&str> = object
                    .abilities
                    .iter()
                    .filter(|a| !is_mana_ability(a))
                    .map(String::as_str)
                    .collect();
                let text = if abilities.is_empty() {
                    card.name.clone()
                } else {
                    format!("{} - {}", card.name, abilities.join("; "))
                };
                (format!("{text} [Activate]"), ChoiceKind::Activate)
            }
            Some((card, _)) => {
                let tag = if card.is_land() {
                    "[Land]"
                } else if card.is_creature() {
                    "[Creature]"
                } else {
                    "[Cast]"
                };
                (format!("{} {tag}", describe_card(card)), ChoiceKind::Play)
            }
            None => {
                let text = object
                    .abilities
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "Unknown object".to_string());
                (format!("{text} [Activate]"), ChoiceKind::Activate)
            }
        };
        list.push(description, kind, HiddenAnswer::Object(object.id));
    }
}

fn enumerate_targets(request: &TargetRequest, snapshot: &GameSnapshot, list: &mut ChoiceList) {
    for id in request.candidates() {
        list.push(
            describe_target(id, request, snapshot),
            ChoiceKind::Target,
            HiddenAnswer::Object(id),
        );
    }
}

fn enumerate_mana(
    prompt: &str,
    target: Option<ObjectId>,
    snapshot: &GameSnapshot,
    list: &mut ChoiceList,
) {
    for source in mana::tap_sources(snapshot, target) {
        let name = snapshot
            .find_card(source.id)
            .map(|(card, _)| card.name.as_str())
            .unwrap_or("Mana source");
        let abilities: Vec<&str> = source
            .abilities
            .iter()
            .filter(|a| is_mana_ability(a))
            .map(String::as_str)
            .collect();
        list.push(
            format!("{name} - {}", abilities.join("; ")),
            ChoiceKind::TapSource,
            HiddenAnswer::Object(source.id),
        );
    }

    let pool = snapshot.me().map(|p| p.mana_pool).unwrap_or_default();
    for (color, count) in mana::pool_choices(&pool, prompt) {
        list.push(
            format!("Mana Pool - {} ({count})", color.label()),
            ChoiceKind::PoolMana,
            HiddenAnswer::Pool(color),
        );
    }
}

/// "Name {cost} P/T" with absent parts left out.
fn describe_card(card: &CardView) -> String {
    let mut parts = vec![card.name.clone()];
    if !card.mana_cost.is_empty() {
        parts.push(card.mana_cost.clone());
    }
    if let Some(pt) = card.pt() {
        parts.push(pt);
    }
    parts.join(" ")
}

fn describe_target(id: ObjectId, request: &TargetRequest, snapshot: &GameSnapshot) -> String {
    let card = request
        .cards
        .iter()
        .find(|c| c.id == id)
        .or_else(|| snapshot.find_card(id).map(|(card, _)| card));

    if let Some(card) = card {
        let mut text = card.name.clone();
        if !card.mana_cost.is_empty() {
            text.push(' ');
            text.push_str(&card.mana_cost);
        }
        if let Some(pt) = card.pt() {
            text.push_str(&format!(" ({pt})"));
        }
        if card.tapped {
            text.push_str(" [tapped]");
        }
        if let Some(controller) = &card.controller {
            text.push_str(&format!(", controlled by {controller}"));
        }
        return text;
    }

    if let Some(player) = snapshot.player_by_object(id) {
        let who = if snapshot.is_me(player) { " (you)" } else { "" };
        return format!("Player {}{who}, {} life", player.name, player.life);
    }

    "Unknown target".to_string()
}

fn mulligan_info(snapshot: &GameSnapshot) -> MulliganInfo {
    let your_hand: Vec<HandCard> = snapshot
        .hand
        .iter()
        .map(|card| HandCard {
            name: card.name.clone(),
            mana_cost: card.mana_cost.clone(),
            mana_value: card.mana_value,
            is_land: card.is_land(),
            power_toughness: card.pt(),
        })
        .collect();
    MulliganInfo {
        land_count: your_hand.iter().filter(|c| c.is_land).count(),
        hand_size: your_hand.len(),
        your_hand,
    }
}
