//! Prompt assembly for movie question answering.
//!
//! The context block is the only movie knowledge the provider is allowed to
//! use; the instruction frame says so explicitly so that answers stay
//! grounded in retrieved records.

use crate::catalog::MovieRecord;

/// Plot summaries are clipped to this many characters in the context block.
const PLOT_SNIPPET_CHARS: usize = 200;

pub fn context_block(records: &[MovieRecord]) -> String {
    let mut block = String::from("Relevant Movies:\n");
    for (i, record) in records.iter().enumerate() {
        let plot: String = record.plot.chars().take(PLOT_SNIPPET_CHARS).collect();
        block.push_str(&format!(
            "{}. {} ({}) - Genres: {} - Rating: {:.2} - Plot: {}\n",
            i + 1,
            record.title,
            record.year,
            record.genres.join(", "),
            record.avg_rating,
            plot
        ));
    }
    block
}

pub fn build_prompt(query: &str, records: &[MovieRecord]) -> String {
    format!(
        "You are a helpful movie assistant. Answer the user's question using \
         only the context below. If the context does not contain the answer, \
         say you don't know.\n\n{}\nQuestion: {}\nAnswer:",
        context_block(records),
        query
    )
}
