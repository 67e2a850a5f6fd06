//! Text rendering of the recipe table for Telegram (MarkdownV2).

use crate::list::RecipeList;
use crate::recipe::Recipe;
use crate::scroll::ScrollPosition;

pub const ROW_HEIGHT: u32 = 40;
pub const VIEWPORT_ROWS: usize = 10;
pub const LOADING_TEXT: &str = "Loading recipes...";

static SPECIAL_CHARACTERS: [char; 18] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

pub fn escape_markdown(str: &str) -> String {
    let mut new_str = String::with_capacity(str.len());
    for c in str.chars() {
        if c == '\\' || SPECIAL_CHARACTERS.contains(&c) {
            new_str.push('\\');
        }
        new_str.push(c)
    }
    new_str
}

// inside (...) of an inline link only ')' and '\' must be escaped
fn escape_link(url: &str) -> String {
    url.replace('\\', "\\\\").replace(')', "\\)")
}

/// Scroll position of a viewport whose first visible row is `first_row`.
pub fn scroll_position(first_row: usize, total_rows: usize) -> ScrollPosition {
    ScrollPosition {
        viewport_height: VIEWPORT_ROWS as u32 * ROW_HEIGHT,
        scroll_top: first_row as u32 * ROW_HEIGHT,
        document_height: total_rows as u32 * ROW_HEIGHT,
    }
}

/// First row of the screen below (`forward`) or above the current one.
pub fn scroll_rows(first_row: usize, total_rows: usize, forward: bool) -> usize {
    if forward {
        let last_screen = total_rows.saturating_sub(VIEWPORT_ROWS);
        (first_row + VIEWPORT_ROWS).min(last_screen)
    } else {
        first_row.saturating_sub(VIEWPORT_ROWS)
    }
}

fn render_row(index: usize, recipe: &Recipe) -> String {
    format!(
        "{}\\. [image]({}) *{}*\n`/edit {}`  `/delete {}`",
        index + 1,
        escape_link(&recipe.image),
        escape_markdown(&recipe.title),
        recipe.id,
        recipe.id
    )
}

/// The loading text while the first page is in flight, the fetch error if
/// there is one, otherwise the rows visible from `first_row`.
pub fn render_list(list: &RecipeList, first_row: usize) -> String {
    if list.is_loading() && list.cursor().page == 1 {
        return escape_markdown(LOADING_TEXT);
    }
    if let Some(error) = list.error() {
        return escape_markdown(error);
    }
    let recipes = list.recipes();
    if recipes.is_empty() {
        return escape_markdown("No recipes.");
    }
    let start = first_row.min(recipes.len().saturating_sub(1));
    let end = (start + VIEWPORT_ROWS).min(recipes.len());
    let mut text = format!("*Recipes* {}\\-{} of {}", start + 1, end, recipes.len());
    for (index, recipe) in recipes[start..end].iter().enumerate() {
        text.push_str("\n\n");
        text.push_str(&render_row(start + index, recipe));
    }
    if list.is_loading() {
        text.push_str("\n\n_");
        text.push_str(&escape_markdown(LOADING_TEXT));
        text.push('_');
    }
    text
}
