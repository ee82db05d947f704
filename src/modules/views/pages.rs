//! HTML rendering for the frontend pages.

use std::fmt::Write;

use serde::Deserialize;

use super::flash::Notice;
use crate::modules::books::models::{Book, BookInput, DEFAULT_STATUS};
use crate::utils::escape_html;

/// Reading statuses offered as suggestions in the form.
const STATUS_CHOICES: [&str; 3] = [DEFAULT_STATUS, "Leyendo", "Leído"];

/// The four editable fields as submitted by the add and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub autor: String,
    #[serde(default)]
    pub genero: String,
    #[serde(default)]
    pub estado: String,
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            titulo: book.title.clone(),
            autor: book.author.clone(),
            genero: book.genre.clone(),
            estado: book.status.clone(),
        }
    }
}

impl From<BookForm> for BookInput {
    fn from(form: BookForm) -> Self {
        Self {
            title: Some(form.titulo),
            author: Some(form.autor),
            genre: Some(form.genero),
            status: Some(form.estado),
        }
    }
}

/// Wraps `body` in the shared page chrome, notices first.
pub fn layout(title: &str, notices: &[Notice], body: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} | Shelf</title>\n</head>\n<body>\n\
         <nav><a href=\"/\">Books</a> | <a href=\"/add\">Add book</a></nav>\n<main>\n",
        escape_html(title)
    );
    for notice in notices {
        let _ = writeln!(
            html,
            "<div class=\"notice notice-{}\" role=\"alert\">{}</div>",
            notice.level.as_str(),
            escape_html(&notice.message)
        );
    }
    let _ = write!(
        html,
        "<h1>{}</h1>\n{body}</main>\n</body>\n</html>\n",
        escape_html(title)
    );
    html
}

pub fn book_list(books: &[Book], query: &str) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<form method=\"get\" action=\"/\">\
         <input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Title or author\">\
         <button type=\"submit\">Search</button></form>",
        escape_html(query)
    );

    if books.is_empty() {
        html.push_str("<p class=\"empty\">No books found.</p>\n");
        return html;
    }

    html.push_str(
        "<table>\n<thead><tr><th>Title</th><th>Author</th><th>Genre</th>\
         <th>Status</th><th></th></tr></thead>\n<tbody>\n",
    );
    for book in books {
        let id = escape_html(&book.id);
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/edit/{id}\">Edit</a> <a href=\"/delete/{id}\">Delete</a></td></tr>",
            escape_html(&book.title),
            escape_html(&book.author),
            escape_html(&book.genre),
            escape_html(&book.status),
        );
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

/// Add/edit form posting to `action`.
pub fn book_form(action: &str, values: &BookForm, submit: &str) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"{}\">",
        escape_html(action)
    );
    for (name, label, value, required) in [
        ("titulo", "Title", &values.titulo, true),
        ("autor", "Author", &values.autor, true),
        ("genero", "Genre", &values.genero, false),
    ] {
        let _ = writeln!(
            html,
            "<label>{label} <input type=\"text\" name=\"{name}\" value=\"{}\"{}></label>",
            escape_html(value),
            if required { " required" } else { "" }
        );
    }

    let status = if values.estado.is_empty() {
        DEFAULT_STATUS
    } else {
        values.estado.as_str()
    };
    let _ = writeln!(
        html,
        "<label>Status <input type=\"text\" name=\"estado\" list=\"statuses\" value=\"{}\"></label>",
        escape_html(status)
    );
    html.push_str("<datalist id=\"statuses\">");
    for choice in STATUS_CHOICES {
        let _ = write!(html, "<option value=\"{}\">", escape_html(choice));
    }
    html.push_str("</datalist>\n");

    let _ = writeln!(
        html,
        "<button type=\"submit\">{}</button> <a href=\"/\">Cancel</a>\n</form>",
        escape_html(submit)
    );
    html
}

pub fn delete_confirmation(book: &Book) -> String {
    format!(
        "<p>Delete <strong>{}</strong> by {}?</p>\n\
         <form method=\"post\" action=\"/delete/{}\">\
         <button type=\"submit\">Delete</button> <a href=\"/\">Cancel</a></form>\n",
        escape_html(&book.title),
        escape_html(&book.author),
        escape_html(&book.id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str, author: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            genre: String::new(),
            status: DEFAULT_STATUS.to_string(),
        }
    }

    #[test]
    fn layout_renders_notices_escaped() {
        let html = layout(
            "Books",
            &[Notice::danger("<b>down</b>")],
            "<p>body</p>\n",
        );
        assert!(html.contains("notice-danger"));
        assert!(html.contains("&lt;b&gt;down&lt;/b&gt;"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn list_links_each_book_and_escapes_fields() {
        let html = book_list(&[book("b1", "Dune & <Co>", "Herbert")], "du\"ne");
        assert!(html.contains("href=\"/edit/b1\""));
        assert!(html.contains("href=\"/delete/b1\""));
        assert!(html.contains("Dune &amp; &lt;Co&gt;"));
        assert!(html.contains("value=\"du&quot;ne\""));
    }

    #[test]
    fn empty_list_says_so() {
        assert!(book_list(&[], "").contains("No books found."));
    }

    #[test]
    fn form_prefills_values_and_defaults_status() {
        let html = book_form("/add", &BookForm::default(), "Add");
        assert!(html.contains("action=\"/add\""));
        assert!(html.contains("name=\"estado\" list=\"statuses\" value=\"No leído\""));

        let values = BookForm::from(&book("b1", "Dune", "Herbert"));
        let html = book_form("/edit/b1", &values, "Save");
        assert!(html.contains("name=\"titulo\" value=\"Dune\""));
        assert!(html.contains("name=\"autor\" value=\"Herbert\""));
    }

    #[test]
    fn form_converts_to_full_input() {
        let input = BookInput::from(BookForm {
            titulo: "Dune".to_string(),
            autor: "Herbert".to_string(),
            genero: String::new(),
            estado: "Leído".to_string(),
        });
        assert_eq!(input.title.as_deref(), Some("Dune"));
        assert_eq!(input.genre.as_deref(), Some(""));
        assert_eq!(input.status.as_deref(), Some("Leído"));
    }

    #[test]
    fn confirmation_posts_to_delete() {
        let html = delete_confirmation(&book("b1", "Dune", "Herbert"));
        assert!(html.contains("action=\"/delete/b1\""));
        assert!(html.contains("<strong>Dune</strong>"));
    }
}
