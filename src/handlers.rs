// src/handlers.rs
use barista_config::{BaristaConfig, ConfigValidator, ScriptConfig};
use barista_core::{BaristaError, BaristaResult, Category, Slot};
use barista_nlu::{Classifier, TemplateClassifier};
use tracing::info;

use crate::commands::UiCommand;
use crate::engine::{DialogueEngine, HandlerContext};
use crate::responses::{PhraseSelector, RandomSelector, ResponseBook};
use crate::session::{ConversationState, Transition};

type HandlerFn = fn(&mut HandlerContext<'_>) -> BaristaResult<()>;

struct HandlerSpec {
    name: &'static str,
    responses: &'static [&'static str],
    run: HandlerFn,
}

const DETAIL_RESPONSES: &[&str] = &[
    "name_thanks",
    "address_thanks",
    "note_thanks",
    "ask_name",
    "ask_address",
    "ask_note",
    "closing",
];

const HANDLERS: &[HandlerSpec] = &[
    HandlerSpec {
        name: "menu",
        responses: &["menu"],
        run: list_menu,
    },
    HandlerSpec {
        name: "order_coffee",
        responses: &["added"],
        run: order_coffee,
    },
    HandlerSpec {
        name: "order_dessert",
        responses: &["added"],
        run: order_dessert,
    },
    HandlerSpec {
        name: "finish_order",
        responses: &["ask_name", "ask_address", "ask_note", "closing"],
        run: finish_order,
    },
    HandlerSpec {
        name: "provide_name",
        responses: DETAIL_RESPONSES,
        run: provide_name,
    },
    HandlerSpec {
        name: "provide_address",
        responses: DETAIL_RESPONSES,
        run: provide_address,
    },
    HandlerSpec {
        name: "provide_note",
        responses: DETAIL_RESPONSES,
        run: provide_note,
    },
    HandlerSpec {
        name: "provide_detail",
        responses: DETAIL_RESPONSES,
        run: provide_detail,
    },
];

pub fn known_intents() -> impl Iterator<Item = &'static str> {
    HANDLERS.iter().map(|spec| spec.name)
}

pub fn build_engine(script: &ScriptConfig, config: &BaristaConfig) -> BaristaResult<DialogueEngine> {
    ConfigValidator::validate(config)?;

    let selector: Box<dyn PhraseSelector> = match config.dialogue.seed {
        Some(seed) => Box::new(RandomSelector::seeded(seed)),
        None => Box::new(RandomSelector::from_entropy()),
    };
    let classifier = Box::new(TemplateClassifier::new(config.nlu.fuzzy_threshold));

    build_engine_with(script, classifier, selector, config.dialogue.use_fallback)
}

pub fn build_engine_with(
    script: &ScriptConfig,
    classifier: Box<dyn Classifier>,
    selector: Box<dyn PhraseSelector>,
    use_fallback: bool,
) -> BaristaResult<DialogueEngine> {
    // Step 1: Validate script
    ConfigValidator::validate_script(script, use_fallback)?;

    let catalog = script.catalog()?;
    let mut responses = ResponseBook::new(script.responses.clone());
    let mut engine = DialogueEngine::new(catalog.clone(), classifier, selector);

    // Step 2: Bind each intent to its handler
    for intent in &script.intents {
        let spec = HANDLERS
            .iter()
            .find(|spec| spec.name == intent.name)
            .ok_or_else(|| BaristaError::UnknownIntent(intent.name.clone()))?;

        for key in spec.responses {
            if !intent.responses.contains_key(*key) && !script.responses.contains_key(*key) {
                return Err(BaristaError::Config(format!(
                    "Intent '{}' needs a '{}' response set",
                    intent.name, key
                )));
            }
        }

        let templates = intent.expanded_templates(&catalog)?;
        engine.register(&intent.name, templates, Box::new(spec.run))?;
        responses.insert_intent(intent.name.clone(), intent.responses.clone());
    }

    info!(
        "Dialogue engine ready: {} intents, {} coffees, {} desserts ({})",
        engine.intent_count(),
        catalog.items(Category::Coffee).len(),
        catalog.items(Category::Dessert).len(),
        engine.classifier_name()
    );

    Ok(engine.with_responses(responses).with_fallback(use_fallback))
}

fn list_menu(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    ctx.begin_order();
    ctx.say("menu")
}

fn order_coffee(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    order_item(ctx, Slot::Coffee)
}

fn order_dessert(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    order_item(ctx, Slot::Dessert)
}

fn order_item(ctx: &mut HandlerContext<'_>, slot: Slot) -> BaristaResult<()> {
    if ctx.state().is_terminal() {
        return Ok(());
    }

    let item = ctx
        .item(slot)
        .cloned()
        .ok_or_else(|| BaristaError::Handler(format!("{} slot was not captured", slot)))?;

    ctx.begin_order();

    let add = match slot {
        Slot::Dessert => {
            ctx.draft_mut().dessert_items.push(item.id.clone());
            UiCommand::AddDessert {
                item: item.id.clone(),
            }
        }
        _ => {
            ctx.draft_mut().coffee_items.push(item.id.clone());
            UiCommand::AddCoffee {
                item: item.id.clone(),
            }
        }
    };

    ctx.emit(UiCommand::Highlight { item: item.id })?;
    ctx.emit(add)?;
    ctx.say("added")
}

fn finish_order(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    match ctx.close() {
        Transition::Moved {
            to: ConversationState::TakingUserDetails,
            ..
        } => follow_up(ctx),
        Transition::Moved {
            to: ConversationState::EndConversation,
            ..
        } => complete_order(ctx),
        _ => Ok(()),
    }
}

fn provide_name(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    match ctx.user_name().map(str::to_string) {
        Some(name) => record_name(ctx, name),
        None => Err(BaristaError::Handler("NAME slot was not captured".to_string())),
    }
}

fn provide_address(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    match ctx.address().map(str::to_string) {
        Some(address) => record_address(ctx, address),
        None => Err(BaristaError::Handler("LOC slot was not captured".to_string())),
    }
}

fn provide_note(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    match ctx.note().map(str::to_string) {
        Some(note) => record_note(ctx, note),
        None => Err(BaristaError::Handler("NOTE slot was not captured".to_string())),
    }
}

// "It's ..." fills whichever detail is still missing, name first.
fn provide_detail(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    let Some(value) = ctx.text(Slot::Name).map(str::to_string) else {
        return Err(BaristaError::Handler("NAME slot was not captured".to_string()));
    };

    let draft = ctx.draft();
    if draft.user_name.is_none() {
        record_name(ctx, value)
    } else if draft.user_address.is_none() {
        record_address(ctx, value)
    } else {
        record_note(ctx, value)
    }
}

fn record_name(ctx: &mut HandlerContext<'_>, name: String) -> BaristaResult<()> {
    if ctx.state().is_terminal() {
        return Ok(());
    }
    ctx.enter_user_details();
    ctx.draft_mut().user_name = Some(name.clone());
    ctx.emit(UiCommand::AddUserName {
        user_name: name.clone(),
    })?;
    ctx.say_with("name_thanks", &[("NAME", name.as_str())])?;
    follow_up(ctx)
}

fn record_address(ctx: &mut HandlerContext<'_>, address: String) -> BaristaResult<()> {
    if ctx.state().is_terminal() {
        return Ok(());
    }
    ctx.enter_user_details();
    ctx.draft_mut().user_address = Some(address.clone());
    ctx.emit(UiCommand::AddUserAddress {
        user_address: address.clone(),
    })?;
    ctx.say_with("address_thanks", &[("LOC", address.as_str())])?;
    follow_up(ctx)
}

fn record_note(ctx: &mut HandlerContext<'_>, note: String) -> BaristaResult<()> {
    if ctx.state().is_terminal() {
        return Ok(());
    }
    ctx.enter_user_details();
    ctx.draft_mut().user_notes = Some(note.clone());
    ctx.emit(UiCommand::AddUserNotes {
        user_notes: note.clone(),
    })?;
    ctx.say_with("note_thanks", &[("NOTE", note.as_str())])?;
    follow_up(ctx)
}

fn follow_up(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    if ctx.complete_if_ready().entered(ConversationState::EndConversation) {
        complete_order(ctx)
    } else {
        ask_next_detail(ctx)
    }
}

fn ask_next_detail(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    let draft = ctx.draft();
    let key = if draft.user_name.is_none() {
        "ask_name"
    } else if draft.user_address.is_none() {
        "ask_address"
    } else if draft.user_notes.is_none() {
        "ask_note"
    } else {
        return Ok(());
    };
    ctx.say(key)
}

fn complete_order(ctx: &mut HandlerContext<'_>) -> BaristaResult<()> {
    let order = ctx.draft().clone();
    info!(
        "Order complete: {} coffees, {} desserts for {}",
        order.coffee_items.len(),
        order.dessert_items.len(),
        order.user_name.as_deref().unwrap_or("guest")
    );
    ctx.say("closing")?;
    ctx.emit(UiCommand::OrderComplete { order })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::FirstPhrase;
    use crate::session::Session;
    use barista_core::OutputEvent;

    fn engine() -> DialogueEngine {
        let script = ScriptConfig::builtin().unwrap();
        build_engine_with(
            &script,
            Box::new(TemplateClassifier::default()),
            Box::new(FirstPhrase),
            false,
        )
        .unwrap()
    }

    fn speech(outputs: &[OutputEvent]) -> Vec<&str> {
        outputs.iter().filter_map(OutputEvent::as_speech).collect()
    }

    fn commands(outputs: &[OutputEvent]) -> Vec<&str> {
        outputs.iter().filter_map(OutputEvent::command_name).collect()
    }

    #[test]
    fn every_builtin_intent_has_a_handler() {
        let script = ScriptConfig::builtin().unwrap();
        for intent in &script.intents {
            assert!(known_intents().any(|name| name == intent.name), "{}", intent.name);
        }
        assert_eq!(engine().intent_count(), script.intents.len());
    }

    #[test]
    fn rejects_intents_without_a_handler() {
        let mut script = ScriptConfig::builtin().unwrap();
        script.intents[0].name = "sing".to_string();

        let result = build_engine_with(
            &script,
            Box::new(TemplateClassifier::default()),
            Box::new(FirstPhrase),
            false,
        );
        assert!(matches!(result, Err(BaristaError::UnknownIntent(name)) if name == "sing"));
    }

    #[test]
    fn rejects_scripts_missing_a_response_set() {
        let mut script = ScriptConfig::builtin().unwrap();
        script.responses.remove("closing");

        let result = build_engine_with(
            &script,
            Box::new(TemplateClassifier::default()),
            Box::new(FirstPhrase),
            false,
        );
        assert!(matches!(result, Err(BaristaError::Config(_))));
    }

    #[test]
    fn ordering_highlights_and_adds_the_item() {
        let engine = engine();
        let mut session = Session::new();

        let outputs = engine
            .handle_utterance(&mut session, "Can I get one apple pie please")
            .unwrap();

        assert_eq!(commands(&outputs), vec!["highlight", "addDessert"]);
        assert_eq!(speech(&outputs), vec!["Sure, adding a apple pie to your order"]);
        assert_eq!(session.draft().dessert_items, vec!["apple-pie"]);
    }

    #[test]
    fn fuzzy_coffee_names_snap_to_the_menu() {
        let engine = engine();
        let mut session = Session::new();

        engine.handle_utterance(&mut session, "Can I get a capuccino").unwrap();
        assert_eq!(session.draft().coffee_items, vec!["cappuccino"]);
    }

    #[test]
    fn finishing_asks_for_a_name() {
        let engine = engine();
        let mut session = Session::new();

        engine.handle_utterance(&mut session, "one latte").unwrap();
        let outputs = engine.handle_utterance(&mut session, "That's all").unwrap();

        assert_eq!(session.state(), ConversationState::TakingUserDetails);
        assert_eq!(speech(&outputs), vec!["Great ! Can I get your name ?"]);
    }

    #[test]
    fn finishing_before_ordering_says_nothing() {
        let engine = engine();
        let mut session = Session::new();

        let outputs = engine.handle_utterance(&mut session, "I'm done").unwrap();
        assert!(outputs.is_empty());
        assert_eq!(session.state(), ConversationState::Initiate);
    }

    #[test]
    fn detail_phrasing_fills_the_first_missing_detail() {
        let engine = engine();
        let mut session = Session::new();

        engine.handle_utterance(&mut session, "It's Sam").unwrap();
        let outputs = engine.handle_utterance(&mut session, "It is 12 Elm Road").unwrap();

        assert_eq!(session.draft().user_name.as_deref(), Some("Sam"));
        assert_eq!(session.draft().user_address.as_deref(), Some("12 Elm Road"));
        assert_eq!(commands(&outputs), vec!["addUserAddress"]);
        assert_eq!(
            speech(&outputs),
            vec![
                "Thanks ! Your order will be sent to 12 Elm Road",
                "Any comments for the barista?"
            ]
        );
    }

    #[test]
    fn last_detail_completes_the_order() {
        let engine = engine();
        let mut session = Session::new();

        engine.handle_utterance(&mut session, "one latte").unwrap();
        engine.handle_utterance(&mut session, "My name is Sam").unwrap();
        engine.handle_utterance(&mut session, "deliver it to 12 Elm Road").unwrap();
        let outputs = engine.handle_utterance(&mut session, "note is ring twice").unwrap();

        assert!(session.is_finished());
        assert!(session.draft().completed_at.is_some());
        assert_eq!(commands(&outputs), vec!["addUserNotes", "orderComplete"]);
        assert_eq!(speech(&outputs).last(), Some(&"Thanks ! Your order is on its way"));

        let after = engine.handle_utterance(&mut session, "one latte").unwrap();
        assert!(after.is_empty());
        assert_eq!(session.draft().coffee_items, vec!["latte"]);
    }

    #[test]
    fn details_wait_for_an_item_before_completing() {
        let engine = engine();
        let mut session = Session::new();

        engine.handle_utterance(&mut session, "My name is Sam").unwrap();
        engine.handle_utterance(&mut session, "deliver it to 12 Elm Road").unwrap();
        let outputs = engine.handle_utterance(&mut session, "note is ring twice").unwrap();

        assert_eq!(session.state(), ConversationState::TakingUserDetails);
        assert_eq!(commands(&outputs), vec!["addUserNotes"]);
        assert!(session.draft().completed_at.is_none());

        engine.handle_utterance(&mut session, "one latte").unwrap();
        assert_eq!(session.state(), ConversationState::TakingOrder);

        let outputs = engine.handle_utterance(&mut session, "I'm done").unwrap();
        assert!(session.is_finished());
        assert_eq!(commands(&outputs), vec!["orderComplete"]);
    }
}
