//! User-facing strings in English and Spanish.

use crate::domain::Lang;

#[derive(Debug, Clone, Copy)]
pub struct Texts {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub category_label: &'static str,
    pub score_label: &'static str,
    pub predict_button: &'static str,
    pub result_title: &'static str,
    pub approve: &'static str,
    pub not_approve: &'static str,
    pub confidence: &'static str,
    pub clamped_note: &'static str,
    pub loaded: &'static str,
    pub editing_hint: &'static str,
    pub invalid_score: &'static str,
    pub no_prediction: &'static str,
    pub record_written: &'static str,
    pub record_failed: &'static str,
    pub help: &'static str,
}

const EN: Texts = Texts {
    title: "Course Approval Prediction",
    subtitle: "Make an individual prediction",
    category_label: "Felder learning style",
    score_label: "University admission exam score",
    predict_button: "Predict",
    result_title: "Prediction result for your input",
    approve: "Approve",
    not_approve: "Not approve",
    confidence: "confidence",
    clamped_note: "score was outside the fitted domain and has been clamped",
    loaded: "Encoder, scaler and model loaded successfully.",
    editing_hint: "Editing score. Enter to apply, Esc to cancel.",
    invalid_score: "Invalid score",
    no_prediction: "No prediction to record yet.",
    record_written: "Wrote",
    record_failed: "Record write failed",
    help: "↑/↓ field  ←/→ change  Enter edit/predict  p predict  d record  l language  q quit",
};

const ES: Texts = Texts {
    title: "Predicción de Aprobación de Curso",
    subtitle: "Realizar una predicción individual",
    category_label: "Tipo de Felder",
    score_label: "Nota del Examen de Admisión de la Universidad",
    predict_button: "Predecir",
    result_title: "Resultado de la predicción para tu entrada",
    approve: "Aprueba",
    not_approve: "No aprueba",
    confidence: "confianza",
    clamped_note: "la nota estaba fuera del rango de entrenamiento y se ajustó al límite",
    loaded: "Codificador, escalador y modelo cargados correctamente.",
    editing_hint: "Editando nota. Enter para aplicar, Esc para cancelar.",
    invalid_score: "Nota no válida",
    no_prediction: "Todavía no hay una predicción para registrar.",
    record_written: "Registro guardado en",
    record_failed: "No se pudo guardar el registro",
    help: "↑/↓ campo  ←/→ cambiar  Enter editar/predecir  p predecir  d registro  l idioma  q salir",
};

pub fn texts(lang: Lang) -> &'static Texts {
    match lang {
        Lang::En => &EN,
        Lang::Es => &ES,
    }
}

impl Texts {
    pub fn verdict(&self, approved: bool) -> &'static str {
        if approved { self.approve } else { self.not_approve }
    }
}
