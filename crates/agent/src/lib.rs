//! The reflection cycle, the heart of CareerLens.
//!
//! 1. **Ask**: compose a question request from the newest reflections
//!    (or a cold-start prompt) and send it to the generator
//! 2. **Save**: validate the user's answer and append it to the store
//! 3. **Advise**: compose an advice request over the entire history
//!
//! [`composer`] is pure and does no I/O; [`ReflectionCoach`] wires it to a
//! [`ReflectionStore`](careerlens_core::ReflectionStore) and a
//! [`Generator`](careerlens_core::Generator).

pub mod coach;
pub mod composer;

pub use coach::ReflectionCoach;
pub use composer::{
    QUESTION_HISTORY_LIMIT, compose_advice_request, compose_question_request, render_history,
};
