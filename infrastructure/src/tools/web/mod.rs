//! **Web Tools**: the `web_search` provider
//!
//! | Backend | When | Key Dependency |
//! |---------|------|----------------|
//! | JSON search endpoint | `[tools.web_search] endpoint` is set | `reqwest` |
//! | DuckDuckGo Instant Answer API | no endpoint configured | `reqwest` |
//!
//! Both backends answer with `{"results": [{title, url, snippet, score}]}`,
//! the payload the retriever decodes during escalation.

mod search;

pub use search::{SearchBackend, WebSearchProvider, web_search_definition};
