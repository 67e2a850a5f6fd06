use dotenv::dotenv;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::types::ParseMode;
use teloxide::{prelude::*, utils::command::BotCommands};

use cooking_list::api::SpoonacularClient;
use cooking_list::config::Config;
use cooking_list::feed::{RecipeFeed, DELETED, FAILED, LOADED, UPDATED};
use cooking_list::recipe::Recipe;
use cooking_list::scroll::ScrollListener;
use cooking_list::storage::{LocalStorage, SqliteStorage};
use cooking_list::view;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type MyDialogue = Dialogue<State, InMemStorage<State>>;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
enum Command {
    #[command(description = "Display this text.")]
    Help,
    #[command(description = "Show the recipes on screen.")]
    List,
    #[command(description = "Scroll one screen down.")]
    Down,
    #[command(description = "Scroll one screen up.")]
    Up,
    #[command(description = "Delete the recipe with the given id.")]
    Delete(i64),
    #[command(description = "Edit the title of the recipe with the given id.")]
    Edit(i64),
    #[command(description = "Save the edited title.")]
    Save,
    #[command(description = "Discard the edited title.")]
    Cancel,
}

/// Per-chat dialogue. An open editor carries its own copy of the recipe, so
/// chats editing at the same time never see each other's drafts.
#[derive(Clone, Debug)]
pub enum State {
    Browsing { first_row: usize },
    Editing { first_row: usize, draft: Recipe },
}

impl Default for State {
    fn default() -> Self {
        State::Browsing { first_row: 0 }
    }
}

impl State {
    fn first_row(&self) -> usize {
        match self {
            State::Browsing { first_row } | State::Editing { first_row, .. } => *first_row,
        }
    }

    fn at_row(self, first_row: usize) -> State {
        match self {
            State::Browsing { .. } => State::Browsing { first_row },
            State::Editing { draft, .. } => State::Editing { first_row, draft },
        }
    }
}

#[tokio::main]
async fn main() {
    // Load all env variables from .env file.
    dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> HandlerResult {
    let config = Config::load()?;
    log::info!("Starting bot...");

    let bot = Bot::from_env();

    let storage: Arc<dyn LocalStorage> = match &config.db_path {
        Some(path) => Arc::new(SqliteStorage::open(path)?),
        None => Arc::new(SqliteStorage::open_in_memory()?),
    };
    let api = Arc::new(SpoonacularClient::new(config.api_url.clone(), config.api_key.clone()));
    let feed = Arc::new(RecipeFeed::new(api, storage));
    for event in [LOADED, FAILED, DELETED, UPDATED] {
        feed.subscribe(event, |event| log::info!("Feed event: {:?}", event));
    }
    let listener = Arc::new(ScrollListener::new(feed.clone(), config.scroll_debounce));

    let initial = feed.clone();
    tokio::spawn(async move {
        initial.start().await;
    });

    let commands = teloxide::filter_command::<Command, _>()
        .branch(dptree::case![Command::Help].endpoint(help))
        .branch(dptree::case![Command::List].endpoint(list))
        .branch(dptree::case![Command::Down].endpoint(scroll_down))
        .branch(dptree::case![Command::Up].endpoint(scroll_up))
        .branch(dptree::case![Command::Delete(id)].endpoint(delete))
        .branch(dptree::case![Command::Edit(id)].endpoint(edit))
        .branch(dptree::case![Command::Save].endpoint(save))
        .branch(dptree::case![Command::Cancel].endpoint(cancel));

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<State>, State>()
        .branch(commands)
        .branch(dptree::case![State::Editing { first_row, draft }].endpoint(receive_title));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            feed,
            listener.clone(),
            InMemStorage::<State>::new()
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    listener.dispose();
    Ok(())
}

async fn reply(bot: &Bot, msg: &Message, text: String) -> HandlerResult {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

async fn list(bot: Bot, msg: Message, feed: Arc<RecipeFeed>, state: State) -> HandlerResult {
    let text = feed.with_list(|list| view::render_list(list, state.first_row()));
    reply(&bot, &msg, text).await
}

async fn scroll(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    feed: Arc<RecipeFeed>,
    listener: Arc<ScrollListener>,
    state: State,
    forward: bool,
) -> HandlerResult {
    let total = feed.with_list(|list| list.len());
    let first_row = view::scroll_rows(state.first_row(), total, forward);
    listener.on_scroll(view::scroll_position(first_row, total));
    dialogue.update(state.at_row(first_row)).await?;
    let text = feed.with_list(|list| view::render_list(list, first_row));
    reply(&bot, &msg, text).await
}

async fn scroll_down(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    feed: Arc<RecipeFeed>,
    listener: Arc<ScrollListener>,
    state: State,
) -> HandlerResult {
    scroll(bot, dialogue, msg, feed, listener, state, true).await
}

async fn scroll_up(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    feed: Arc<RecipeFeed>,
    listener: Arc<ScrollListener>,
    state: State,
) -> HandlerResult {
    scroll(bot, dialogue, msg, feed, listener, state, false).await
}

async fn delete(bot: Bot, msg: Message, feed: Arc<RecipeFeed>, id: i64) -> HandlerResult {
    let text = if feed.delete(id) {
        "Recipe deleted".to_string()
    } else {
        format!("No recipe with id {}", id)
    };
    reply(&bot, &msg, view::escape_markdown(&text)).await
}

async fn edit(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    feed: Arc<RecipeFeed>,
    state: State,
    id: i64,
) -> HandlerResult {
    let Some(draft) = feed.open_editor(id) else {
        let text = format!("No recipe with id {}", id);
        return reply(&bot, &msg, view::escape_markdown(&text)).await;
    };
    let text = format!(
        "Editing *{}*\n\n{}",
        view::escape_markdown(&draft.title),
        view::escape_markdown("Send the new title, then /save or /cancel.")
    );
    dialogue
        .update(State::Editing {
            first_row: state.first_row(),
            draft,
        })
        .await?;
    reply(&bot, &msg, text).await
}

async fn receive_title(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    (first_row, mut draft): (usize, Recipe),
) -> HandlerResult {
    let Some(title) = msg.text().map(str::trim).filter(|t| !t.is_empty()) else {
        return reply(&bot, &msg, view::escape_markdown("Send the new title as text.")).await;
    };
    draft.title = title.to_string();
    let text = format!(
        "Title set to *{}*\n\n{}",
        view::escape_markdown(title),
        view::escape_markdown("/save to keep it, /cancel to discard it.")
    );
    dialogue.update(State::Editing { first_row, draft }).await?;
    reply(&bot, &msg, text).await
}

async fn save(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    feed: Arc<RecipeFeed>,
    state: State,
) -> HandlerResult {
    let first_row = state.first_row();
    let text = match state {
        State::Editing { draft, .. } => {
            if feed.save(draft) {
                "Recipe updated"
            } else {
                "That recipe no longer exists."
            }
        }
        State::Browsing { .. } => "Nothing is being edited.",
    };
    dialogue.update(State::Browsing { first_row }).await?;
    reply(&bot, &msg, view::escape_markdown(text)).await
}

async fn cancel(bot: Bot, dialogue: MyDialogue, msg: Message, state: State) -> HandlerResult {
    let text = match state {
        State::Editing { .. } => "Edit cancelled",
        State::Browsing { .. } => "Nothing is being edited.",
    };
    dialogue
        .update(State::Browsing {
            first_row: state.first_row(),
        })
        .await?;
    reply(&bot, &msg, view::escape_markdown(text)).await
}
