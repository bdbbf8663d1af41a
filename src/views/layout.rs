use maud::{html, Markup, DOCTYPE};

use crate::utils;

fn css() -> Markup {
    html! {
        link rel="stylesheet" href="/static/index.css";
    }
}

fn js() -> Markup {
    html! {
        script src="https://unpkg.com/htmx.org@2.0.4" {}
    }
}

fn header() -> Markup {
    html! {
        header {
            nav {
                ul {
                    li {
                        a href="/" {
                            strong { "Trainyard" }
                        }
                    }
                }
                ul {
                    li { (utils::VERSION) }
                }
            }
        }
    }
}

fn main(body: Markup) -> Markup {
    html! {
        main { (body) }
    }
}

pub fn page(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            meta name="color-scheme" content="light dark";

            (css())
            (js())

            title { (format!("{title} - Trainyard")) }
        }

        body."container" {
            (header())
            (main(body))
        }
    }
}

pub fn titled(title: &str, body: Markup) -> Markup {
    html! {
        title { (title) " - Trainyard" }
        (body)
    }
}

/// Full page for direct navigation, fragment for htmx swaps.
pub fn render(is_htmx: bool, title: &str, body: Markup) -> Markup {
    if is_htmx {
        titled(title, body)
    } else {
        page(title, body)
    }
}
