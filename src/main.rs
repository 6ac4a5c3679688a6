mod config;
mod dataset;
mod messages;
mod quiz;

use std::{process, sync::Arc};

use dotenv::dotenv;
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, ParseMode},
    utils::command::BotCommands,
};

use config::Config;
use dataset::Workbook;
use quiz::pools::{resolve_pools, select_pools, DataPools, Resolution};
use quiz::session::{Phase, Session};
use quiz::{Label, Level, QuizError};

type QuizDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    ReceiveLevel1Sheet {
        sheet_names: Vec<String>,
    },
    ReceiveLevel2Sheet {
        sheet_names: Vec<String>,
        level1_sheet: usize,
    },
    ReceiveLevelChoice {
        pools: DataPools,
    },
    Quiz {
        pools: DataPools,
        session: Session,
    },
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
enum Command {
    #[command(description = "start over")]
    Start,
    #[command(description = "forget the current round and the sheet choice")]
    Reset,
}

/// Everything loaded at startup, shared read-only between chats.
pub struct Library {
    pub workbook: Workbook,
    pub resolution: Resolution,
}

#[tokio::main]
async fn main() {
    let dotenv_result = dotenv();
    pretty_env_logger::init();
    if let Err(err) = dotenv_result {
        log::debug!("No .env file loaded: {}", err);
    }
    log::info!("Starting problem/suffering quiz bot...");

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            process::exit(1);
        }
    };

    log::info!("Loading sheets from {}", config.data_path.display());
    let workbook = match dataset::load_workbook(&config.data_path) {
        Ok(workbook) => workbook,
        Err(err) => {
            log::error!("Failed to load quiz data: {}", err);
            process::exit(1);
        }
    };
    let resolution = resolve_pools(&workbook);
    log_resolution(&workbook, &resolution);

    let library = Arc::new(Library {
        workbook,
        resolution,
    });

    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(teloxide::filter_command::<Command, _>().endpoint(command))
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(
                dptree::case![State::ReceiveLevel1Sheet { sheet_names }]
                    .endpoint(receive_level1_sheet),
            )
            .branch(
                dptree::case![State::ReceiveLevel2Sheet {
                    sheet_names,
                    level1_sheet
                }]
                .endpoint(receive_level2_sheet),
            )
            .branch(
                dptree::case![State::ReceiveLevelChoice { pools }]
                    .endpoint(receive_level_choice),
            )
            .branch(dptree::case![State::Quiz { pools, session }].endpoint(quiz)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new(), library, config])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

fn log_resolution(workbook: &Workbook, resolution: &Resolution) {
    log::info!("Loaded {} sheet(s)", workbook.sheets.len());
    match resolution {
        Resolution::Matched(pools) => log::info!(
            "Level sheets found by name: level 1 has {} rows, level 2 has {} rows",
            pools.level1.len(),
            pools.level2.len()
        ),
        Resolution::Shared(pools) => log::info!(
            "The first sheet with rows ({}) backs both levels",
            pools.level1.len()
        ),
        Resolution::NeedsSelection {
            fallback,
            sheet_names,
        } => log::warn!(
            "No sheet is named after a level ({}); users pick sheets or use the first one with {} rows",
            sheet_names.join(", "),
            fallback.level1.len()
        ),
        Resolution::Empty => log::warn!("No sheet has any rows, the bot has nothing to ask"),
    }
}

fn level_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(
        Level::ALL
            .iter()
            .map(|level| vec![KeyboardButton::new(level.button_text())])
            .collect::<Vec<_>>(),
    )
    .resize_keyboard(true)
}

fn answer_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![messages::answer_buttons()
        .into_iter()
        .map(KeyboardButton::new)
        .collect::<Vec<_>>()])
    .resize_keyboard(true)
}

fn single_button_keyboard(text: &str) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(text)]]).resize_keyboard(true)
}

fn sheet_keyboard(sheet_names: &[String], offer_first_sheet: bool) -> KeyboardMarkup {
    KeyboardMarkup::new(
        messages::sheet_choice_buttons(sheet_names, offer_first_sheet)
            .into_iter()
            .map(|text| vec![KeyboardButton::new(text)])
            .collect::<Vec<_>>(),
    )
    .resize_keyboard(true)
}

async fn ask_for_level1_sheet(bot: &Bot, msg: &Message, sheet_names: &[String]) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        messages::sheet_choice_text(Level::One, sheet_names),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(sheet_keyboard(sheet_names, true))
    .await?;
    Ok(())
}

async fn command(
    library: Arc<Library>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
    cmd: Command,
) -> HandlerResult {
    match cmd {
        Command::Start => log::debug!("Chat {} started over", msg.chat.id.0),
        Command::Reset => log::debug!("Chat {} reset its quiz", msg.chat.id.0),
    }
    dialogue.reset().await?;
    start(library, bot, dialogue, msg).await
}

async fn start(
    library: Arc<Library>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    bot.send_message(msg.chat.id, messages::GREETING_TEXT).await?;

    match &library.resolution {
        Resolution::Matched(pools) | Resolution::Shared(pools) => {
            ask_for_level(&bot, &msg).await?;
            dialogue
                .update(State::ReceiveLevelChoice {
                    pools: pools.clone(),
                })
                .await?;
        }
        Resolution::NeedsSelection { sheet_names, .. } => {
            ask_for_level1_sheet(&bot, &msg, sheet_names).await?;
            dialogue
                .update(State::ReceiveLevel1Sheet {
                    sheet_names: sheet_names.clone(),
                })
                .await?;
        }
        Resolution::Empty => {
            bot.send_message(msg.chat.id, messages::NO_DATA_TEXT).await?;
        }
    }
    Ok(())
}

async fn ask_for_level(bot: &Bot, msg: &Message) -> HandlerResult {
    bot.send_message(msg.chat.id, messages::LEVEL_PROMPT)
        .reply_markup(level_keyboard())
        .await?;
    Ok(())
}

fn chosen_sheet(msg: &Message, sheet_names: &[String]) -> Option<usize> {
    msg.text()
        .and_then(messages::parse_sheet_button)
        .filter(|index| *index < sheet_names.len())
}

async fn receive_level1_sheet(
    library: Arc<Library>,
    bot: Bot,
    dialogue: QuizDialogue,
    sheet_names: Vec<String>,
    msg: Message,
) -> HandlerResult {
    if msg.text() == Some(messages::FIRST_SHEET_BUTTON) {
        if let Some(pools) = library.resolution.pools() {
            log::debug!("Chat {} went with the first sheet", msg.chat.id.0);
            ask_for_level(&bot, &msg).await?;
            dialogue
                .update(State::ReceiveLevelChoice {
                    pools: pools.clone(),
                })
                .await?;
            return Ok(());
        }
    }

    let Some(level1_sheet) = chosen_sheet(&msg, &sheet_names) else {
        bot.send_message(msg.chat.id, messages::PRESS_A_BUTTON)
            .reply_markup(sheet_keyboard(&sheet_names, true))
            .await?;
        return Ok(());
    };

    bot.send_message(
        msg.chat.id,
        messages::sheet_choice_text(Level::Two, &sheet_names),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(sheet_keyboard(&sheet_names, false))
    .await?;
    dialogue
        .update(State::ReceiveLevel2Sheet {
            sheet_names,
            level1_sheet,
        })
        .await?;
    Ok(())
}

async fn receive_level2_sheet(
    library: Arc<Library>,
    bot: Bot,
    dialogue: QuizDialogue,
    (sheet_names, level1_sheet): (Vec<String>, usize),
    msg: Message,
) -> HandlerResult {
    let Some(level2_sheet) = chosen_sheet(&msg, &sheet_names) else {
        bot.send_message(msg.chat.id, messages::PRESS_A_BUTTON)
            .reply_markup(sheet_keyboard(&sheet_names, false))
            .await?;
        return Ok(());
    };

    match select_pools(&library.workbook, level1_sheet, level2_sheet) {
        Ok(pools) => {
            log::debug!(
                "Chat {} picked sheets {} and {}",
                msg.chat.id.0,
                level1_sheet + 1,
                level2_sheet + 1
            );
            ask_for_level(&bot, &msg).await?;
            dialogue
                .update(State::ReceiveLevelChoice { pools })
                .await?;
        }
        Err(err) => {
            log::warn!("Chat {} sheet choice rejected: {}", msg.chat.id.0, err);
            bot.send_message(msg.chat.id, messages::EMPTY_SELECTION_TEXT)
                .await?;
            ask_for_level1_sheet(&bot, &msg, &sheet_names).await?;
            dialogue
                .update(State::ReceiveLevel1Sheet { sheet_names })
                .await?;
        }
    }
    Ok(())
}

async fn receive_level_choice(
    config: Arc<Config>,
    bot: Bot,
    dialogue: QuizDialogue,
    pools: DataPools,
    msg: Message,
) -> HandlerResult {
    let Some(level) = msg.text().and_then(Level::from_text) else {
        bot.send_message(msg.chat.id, messages::PRESS_A_BUTTON)
            .reply_markup(level_keyboard())
            .await?;
        return Ok(());
    };

    let mut session = Session::new();
    let started = session.start(
        pools.pool(level),
        level.is_hard(),
        config.question_count,
        &mut rand::thread_rng(),
    );
    match started {
        Ok(()) => {
            log::debug!("Chat {} started a {} round", msg.chat.id.0, level);
            send_question(&bot, &msg, &session).await?;
            dialogue.update(State::Quiz { pools, session }).await?;
        }
        Err(QuizError::NoData) => {
            log::warn!("Chat {} picked {} which has no data", msg.chat.id.0, level);
            bot.send_message(msg.chat.id, messages::NO_DATA_FOR_LEVEL_TEXT)
                .reply_markup(level_keyboard())
                .await?;
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn send_question(bot: &Bot, msg: &Message, session: &Session) -> HandlerResult {
    let question = session.current_question()?;
    let (answered, total) = session.progress();
    let text = messages::question_text(answered + 1, total, question);
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(answer_keyboard())
        .await?;
    Ok(())
}

async fn quiz(
    bot: Bot,
    dialogue: QuizDialogue,
    (pools, mut session): (DataPools, Session),
    msg: Message,
) -> HandlerResult {
    match session.phase() {
        Phase::Answering => {
            let Some(label) = msg.text().and_then(Label::from_text) else {
                bot.send_message(msg.chat.id, messages::PRESS_A_BUTTON)
                    .reply_markup(answer_keyboard())
                    .await?;
                return Ok(());
            };

            let feedback = session.submit_answer(label)?;
            bot.send_message(
                msg.chat.id,
                messages::feedback_text(&feedback, session.is_hard()),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(single_button_keyboard(messages::NEXT_BUTTON))
            .await?;
            dialogue.update(State::Quiz { pools, session }).await?;
        }
        Phase::AnswerShown => {
            if msg.text() != Some(messages::NEXT_BUTTON) {
                bot.send_message(msg.chat.id, messages::PRESS_A_BUTTON)
                    .reply_markup(single_button_keyboard(messages::NEXT_BUTTON))
                    .await?;
                return Ok(());
            }

            if session.advance()? == Phase::Completed {
                finish_round(&bot, &msg, &mut session).await?;
                dialogue.update(State::ReceiveLevelChoice { pools }).await?;
            } else {
                send_question(&bot, &msg, &session).await?;
                dialogue.update(State::Quiz { pools, session }).await?;
            }
        }
        Phase::NotStarted | Phase::Completed => {
            log::warn!(
                "Chat {} had an idle session in the quiz state, back to level choice",
                msg.chat.id.0
            );
            ask_for_level(&bot, &msg).await?;
            dialogue.update(State::ReceiveLevelChoice { pools }).await?;
        }
    }
    Ok(())
}

async fn finish_round(bot: &Bot, msg: &Message, session: &mut Session) -> HandlerResult {
    let summary = session.summarize()?;
    log::debug!(
        "Chat {} finished with {}/{} ({}%)",
        msg.chat.id.0,
        summary.score,
        summary.total,
        summary.percent
    );

    bot.send_message(msg.chat.id, messages::summary_text(&summary))
        .parse_mode(ParseMode::Html)
        .await?;
    for (i, wrong) in summary.review.iter().enumerate() {
        bot.send_message(msg.chat.id, messages::review_text(i + 1, wrong))
            .parse_mode(ParseMode::Html)
            .await?;
    }

    session.reset();
    bot.send_message(msg.chat.id, messages::RESTART_PROMPT)
        .reply_markup(level_keyboard())
        .await?;
    Ok(())
}
