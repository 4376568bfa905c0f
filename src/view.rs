//! HTML rendering of the feed state
//!
//! `render` is a pure function of [`FetchState`]: a loading notice, a generic
//! error notice, or one block per image. Error detail is never rendered.

use std::fmt::{self, Display, Formatter, Write};

use html_escaper::HtmlEscaper;

use crate::feed::FetchState;

/// Text shown while requests are in flight
pub const LOADING_TEXT: &str = "Page loading, please wait!!";

/// Text shown for every failure kind
pub const ERROR_TEXT: &str = "A network error was encountered!!";

/// Heading above each image
pub const HEADING_TEXT: &str = "An image";

/// Seconds between reloads while the page is still loading
const LOADING_REFRESH_SECS: u32 = 1;

/// Alternate text for the image at `index`
pub fn alt_text(index: usize) -> String {
    format!("placeholder text {}", index)
}

/// Render the view fragment for a state
pub fn render(state: &FetchState) -> String {
    match state {
        FetchState::Loading => format!("<p>{}</p>", LOADING_TEXT),
        FetchState::Failed(_) => format!("<p>{}</p>", ERROR_TEXT),
        FetchState::Ready(urls) => {
            let blocks = urls
                .iter()
                .enumerate()
                .map(|(index, url)| {
                    format!(
                        "<div><h1>{}</h1><img src=\"{}\" alt=\"{}\"></div>",
                        HEADING_TEXT,
                        Escaped(url),
                        alt_text(index),
                    )
                })
                .collect::<String>();
            format!("<div>{}</div>", blocks)
        }
    }
}

/// Attribute-safe display of an untrusted string
struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(HtmlEscaper(f), "{}", self.0)
    }
}

/// Render a complete HTML document around the fragment
pub fn render_page(state: &FetchState) -> String {
    let refresh = if state.is_loading() {
        format!(
            "<meta http-equiv=\"refresh\" content=\"{}\">",
            LOADING_REFRESH_SECS
        )
    } else {
        String::new()
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n{}<title>gallery</title>\n</head>\n<body>\n<div id=\"root\">{}</div>\n</body>\n</html>\n",
        refresh,
        render(state)
    )
}
