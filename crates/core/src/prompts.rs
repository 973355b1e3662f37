//! The fixed strings a session speaks with.

/// Placeholder replaced by the course name when rendering the plan
/// templates.
pub const TOPIC_PLACEHOLDER: &str = "{{MATERIA}}";

/// The prompt set of a session.
///
/// These are session-wide constants, not per-call configuration: the
/// same persona instruction is attached to every chat request, and the
/// same apology turn stands in for every kind of failure.
#[derive(Clone, Debug)]
pub struct SessionPrompts {
    /// Text of the seeded tutor greeting turn.
    pub greeting: String,
    /// Persona instruction attached to every chat request.
    pub system_instruction: String,
    /// Learner-visible text of an automatic plan request. May contain
    /// [`TOPIC_PLACEHOLDER`].
    pub plan_request: String,
    /// Instruction sent to the backend for a plan request. May contain
    /// [`TOPIC_PLACEHOLDER`].
    pub plan_instruction: String,
    /// The uniform failure turn.
    pub apology: String,
}

impl SessionPrompts {
    #[inline]
    pub(crate) fn render_plan_request(&self, topic: &str) -> String {
        self.plan_request.replace(TOPIC_PLACEHOLDER, topic)
    }

    #[inline]
    pub(crate) fn render_plan_instruction(&self, topic: &str) -> String {
        self.plan_instruction.replace(TOPIC_PLACEHOLDER, topic)
    }
}

impl Default for SessionPrompts {
    fn default() -> Self {
        Self {
            greeting: "¡Hola! Soy tu tutor UBA. ¿En qué puedo ayudarte hoy?"
                .to_owned(),
            system_instruction: include_str!("persona.md")
                .trim_end()
                .to_owned(),
            plan_request: "Generame un plan de estudio para {{MATERIA}}"
                .to_owned(),
            plan_instruction: "Crea un plan de estudios breve (3 puntos \
                clave) para un estudiante de la UBA cursando: {{MATERIA}}. \
                Sé motivador y breve."
                .to_owned(),
            apology:
                "Lo siento, tuve un problema de conexión. Intenta de nuevo."
                    .to_owned(),
        }
    }
}
