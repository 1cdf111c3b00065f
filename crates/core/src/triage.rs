//! Symptom to specialty classification
//!
//! The model is only allowed to answer with a specialty from the live
//! catalog. This module builds the prompt that enumerates the catalog and
//! checks the model's answer against it before anything reaches a patient.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use crate::error::TriageError;
use crate::text::match_key;

/// Triage urgency tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Baja,
    Media,
    Alta,
}

impl Urgency {
    /// Exact match against the schema enum
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "baja" => Some(Urgency::Baja),
            "media" => Some(Urgency::Media),
            "alta" => Some(Urgency::Alta),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Baja => "baja",
            Urgency::Media => "media",
            Urgency::Alta => "alta",
        }
    }

    /// Guidance shown next to the recommendation
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Alta => "Urgencia Alta - Busca atención inmediata",
            Urgency::Media => "Urgencia Media - Consulta en los próximos días",
            Urgency::Baja => "Urgencia Baja - Puedes programar una cita",
        }
    }
}

/// A specialty the model may recommend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpecialtyOption {
    pub id: String,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

/// Read a field that the backend may send in PascalCase or camelCase
fn field<'a>(item: &'a JsonValue, upper: &str, lower: &str) -> Option<&'a JsonValue> {
    item.get(upper)
        .filter(|v| !v.is_null())
        .or_else(|| item.get(lower).filter(|v| !v.is_null()))
}

fn as_text(value: &JsonValue) -> Option<String> {
    let text = match value {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Turn the `/especialidades` response into the allowed option list.
///
/// Accepts `{"items": [...]}` or a bare array. Entries without an id or a
/// name are dropped.
pub fn normalize_catalog(body: &JsonValue) -> Result<Vec<SpecialtyOption>, TriageError> {
    let items: &[JsonValue] = match body {
        JsonValue::Array(items) => items.as_slice(),
        JsonValue::Object(obj) => obj
            .get("items")
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    let options: Vec<SpecialtyOption> = items
        .iter()
        .filter_map(|item| {
            let id = field(item, "EspecialidadId", "especialidadId").and_then(as_text)?;
            let nombre = field(item, "Nombre", "nombre").and_then(as_text)?;
            let descripcion = field(item, "Descripcion", "descripcion").and_then(as_text);
            Some(SpecialtyOption {
                id,
                nombre,
                descripcion,
            })
        })
        .collect();

    if options.is_empty() {
        return Err(TriageError::EmptyCatalog);
    }
    Ok(options)
}

fn find_by_name<'a>(options: &'a [SpecialtyOption], name: &str) -> Option<&'a SpecialtyOption> {
    let key = match_key(name);
    let mut matches = options.iter().filter(|o| match_key(&o.nombre) == key);
    let first = matches.next()?;
    // ambiguous names cannot be repaired
    matches.next().is_none().then_some(first)
}

/// Options to suggest when symptoms are too vague to pick a specialty
fn general_fallbacks(options: &[SpecialtyOption]) -> Vec<&SpecialtyOption> {
    ["Medicina Interna", "Medicina General Integral", "Medicina General"]
        .iter()
        .filter_map(|name| find_by_name(options, name))
        .collect()
}

/// Build the system prompt enumerating every allowed specialty
pub fn build_system_prompt(options: &[SpecialtyOption]) -> String {
    let mut list = String::new();
    for option in options {
        let _ = write!(list, "- ID: {}, Nombre: \"{}\"", option.id, option.nombre);
        if let Some(desc) = &option.descripcion {
            let _ = write!(list, ", Descripción: {desc}");
        }
        list.push('\n');
    }

    let example_ids = options
        .iter()
        .take(3)
        .map(|o| format!("\"{}\"", o.id))
        .collect::<Vec<_>>()
        .join(", ");

    let fallbacks = general_fallbacks(options);
    let vague_rule = if fallbacks.is_empty() {
        "- Si los síntomas son muy generales o ambiguos, elige la especialidad más general de la lista".to_string()
    } else {
        let names = fallbacks
            .iter()
            .map(|o| format!("\"{}\" (ID: \"{}\")", o.nombre, o.id))
            .collect::<Vec<_>>()
            .join(" o ");
        format!("- Si los síntomas son muy generales o ambiguos, recomienda {names}")
    };

    format!(
        r#"Eres un asistente médico virtual que ayuda a pacientes a identificar qué especialidad médica deben consultar según sus síntomas.

Tu tarea es analizar los síntomas del paciente y recomendar la especialidad médica más apropiada de la siguiente lista:

ESPECIALIDADES DISPONIBLES:
{list}
INSTRUCCIONES IMPORTANTES:
1. Analiza cuidadosamente los síntomas descritos por el paciente
2. Identifica la especialidad médica más apropiada de la lista anterior
3. DEBES usar EXACTAMENTE el ID de la especialidad (por ejemplo: {example_ids})
4. DEBES usar EXACTAMENTE el nombre de la especialidad como aparece en la lista
5. Proporciona una explicación clara y comprensible de por qué recomiendas esa especialidad
6. Evalúa el nivel de urgencia:
   - "baja": Síntomas leves que pueden esperar consulta programada (semanas)
   - "media": Síntomas que requieren atención en los próximos días
   - "alta": Síntomas que sugieren necesidad de atención inmediata o urgencia (horas)

CRITERIOS DE URGENCIA ALTA:
- Dolor de pecho intenso o dificultad para respirar
- Pérdida súbita de conciencia o convulsiones
- Sangrado abundante o incontrolable
- Traumatismo severo
- Síntomas de accidente cerebrovascular (confusión, parálisis, dificultad para hablar)
- Dolor abdominal agudo intenso
- Fiebre muy alta con síntomas graves

REGLAS CRÍTICAS:
- SOLO puedes recomendar especialidades de la lista proporcionada
- Usa el ID EXACTO de la lista, nunca una abreviatura inventada
- Escribe en español con tono profesional pero amable
- No uses emojis
- Sé conciso pero informativo en tu explicación (máximo 2-3 oraciones)
{vague_rule}
- Si hay múltiples especialidades posibles, elige la más específica para los síntomas principales

FORMATO DE RESPUESTA:
{{
  "especialidadId": "[ID exacto de la lista]",
  "especialidadNombre": "[Nombre exacto de la especialidad]",
  "explicacion": "[Razón clara y concisa]",
  "urgencia": "[baja|media|alta]"
}}

IMPORTANTE: Este es un sistema de orientación inicial. El resultado ayudará al paciente a encontrar el especialista adecuado, pero no reemplaza una evaluación médica profesional."#
    )
}

/// Build the user turn carrying the patient's own words
pub fn build_user_prompt(symptoms: &str) -> String {
    format!(
        "El paciente describe los siguientes síntomas:\n\n\"{symptoms}\"\n\nAnaliza estos síntomas y recomienda la especialidad médica más apropiada. Recuerda usar el ID exacto y el nombre exacto de la especialidad."
    )
}

/// JSON schema the model's answer must follow
pub fn recommendation_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "especialidadId": {
                "type": "string",
                "description": "El ID de la especialidad médica recomendada según los síntomas"
            },
            "especialidadNombre": {
                "type": "string",
                "description": "El nombre de la especialidad médica recomendada"
            },
            "explicacion": {
                "type": "string",
                "description": "Explicación clara y concisa de por qué se recomienda esta especialidad"
            },
            "urgencia": {
                "type": "string",
                "enum": ["baja", "media", "alta"],
                "description": "Nivel de urgencia recomendado: baja (consulta programada), media (días), alta (inmediato)"
            }
        },
        "required": ["especialidadId", "especialidadNombre", "explicacion", "urgencia"],
        "additionalProperties": false
    })
}

/// Extract the symptom text from a `{"symptoms": "..."}` request body
pub fn symptoms_from_body(body: &JsonValue) -> Result<String, TriageError> {
    body.get("symptoms")
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(TriageError::EmptySymptoms)
}

/// A validated specialty recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRecommendation {
    pub especialidad_id: String,
    pub especialidad_nombre: String,
    pub explicacion: String,
    pub urgencia: Urgency,
    pub urgencia_label: String,
}

fn required_str<'a>(raw: &'a JsonValue, name: &str) -> Result<&'a str, TriageError> {
    let value = raw
        .get(name)
        .ok_or_else(|| TriageError::Schema(format!("missing field '{name}'")))?;
    let text = value
        .as_str()
        .ok_or_else(|| TriageError::Schema(format!("field '{name}' must be a string")))?;
    if text.trim().is_empty() {
        return Err(TriageError::Schema(format!("field '{name}' is empty")));
    }
    Ok(text)
}

/// Check a raw model answer against the schema and the allowed catalog.
///
/// An unknown ID is repaired only when the name identifies exactly one
/// catalog entry. The returned name is always the catalog's.
pub fn validate(
    raw: &JsonValue,
    options: &[SpecialtyOption],
) -> Result<SymptomRecommendation, TriageError> {
    if !raw.is_object() {
        return Err(TriageError::Schema("expected a JSON object".to_string()));
    }
    let id = required_str(raw, "especialidadId")?.trim();
    let nombre = required_str(raw, "especialidadNombre")?;
    let explicacion = required_str(raw, "explicacion")?.trim();
    let urgencia_raw = required_str(raw, "urgencia")?;
    let urgencia = Urgency::parse(urgencia_raw)
        .ok_or_else(|| TriageError::Schema(format!("invalid urgencia '{urgencia_raw}'")))?;

    let option = options
        .iter()
        .find(|o| o.id == id)
        .or_else(|| find_by_name(options, nombre))
        .ok_or_else(|| TriageError::UnknownSpecialty { id: id.to_string() })?;

    Ok(SymptomRecommendation {
        especialidad_id: option.id.clone(),
        especialidad_nombre: option.nombre.clone(),
        explicacion: explicacion.to_string(),
        urgencia,
        urgencia_label: urgencia.label().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<SpecialtyOption> {
        normalize_catalog(&json!({
            "items": [
                {"EspecialidadId": "8", "Nombre": "Cardiología", "Descripcion": "Corazón"},
                {"especialidadId": 29, "nombre": "Medicina Interna"},
                {"especialidadId": "44", "nombre": "Neurología"},
                {"especialidadId": "", "nombre": "Sin ID"},
                {"especialidadId": "99"}
            ]
        }))
        .unwrap()
    }

    fn answer(id: &str, name: &str, urgency: &str) -> JsonValue {
        json!({
            "especialidadId": id,
            "especialidadNombre": name,
            "explicacion": "Los síntomas sugieren una evaluación cardiológica.",
            "urgencia": urgency
        })
    }

    #[test]
    fn test_normalize_mixed_case_fields() {
        let options = catalog();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].descripcion.as_deref(), Some("Corazón"));
        assert_eq!(options[1].id, "29");
    }

    #[test]
    fn test_normalize_bare_array_and_empty() {
        let options = normalize_catalog(&json!([{"especialidadId": "1", "nombre": "Pediatría"}]));
        assert_eq!(options.unwrap().len(), 1);

        assert_eq!(
            normalize_catalog(&json!({"items": []})),
            Err(TriageError::EmptyCatalog)
        );
        assert_eq!(normalize_catalog(&json!("oops")), Err(TriageError::EmptyCatalog));
    }

    #[test]
    fn test_prompt_lists_every_option() {
        let prompt = build_system_prompt(&catalog());
        assert!(prompt.contains("- ID: 8, Nombre: \"Cardiología\", Descripción: Corazón"));
        assert!(prompt.contains("- ID: 44, Nombre: \"Neurología\"\n"));
        assert!(prompt.contains("recomienda \"Medicina Interna\" (ID: \"29\")"));
        assert!(prompt.contains("\"8\", \"29\", \"44\""));
    }

    #[test]
    fn test_user_prompt_quotes_symptoms() {
        let prompt = build_user_prompt("me duele la cabeza");
        assert!(prompt.contains("\"me duele la cabeza\""));
    }

    #[test]
    fn test_validate_accepts_known_id_and_canonical_name() {
        let rec = validate(&answer("8", "cardiologia", "alta"), &catalog()).unwrap();
        assert_eq!(rec.especialidad_id, "8");
        assert_eq!(rec.especialidad_nombre, "Cardiología");
        assert_eq!(rec.urgencia, Urgency::Alta);
        assert_eq!(rec.urgencia_label, "Urgencia Alta - Busca atención inmediata");
    }

    #[test]
    fn test_validate_repairs_id_from_name() {
        let rec = validate(&answer("CARD", "Neurología", "media"), &catalog()).unwrap();
        assert_eq!(rec.especialidad_id, "44");
    }

    #[test]
    fn test_validate_rejects_unknown_specialty() {
        let err = validate(&answer("77", "Oftalmología", "baja"), &catalog()).unwrap_err();
        assert_eq!(err, TriageError::UnknownSpecialty { id: "77".to_string() });
    }

    #[test]
    fn test_validate_rejects_schema_violations() {
        let err = validate(&answer("8", "Cardiología", "urgente"), &catalog()).unwrap_err();
        assert!(matches!(err, TriageError::Schema(_)));

        let err = validate(&json!({"especialidadId": "8"}), &catalog()).unwrap_err();
        assert!(matches!(err, TriageError::Schema(_)));

        let err = validate(&json!([1, 2]), &catalog()).unwrap_err();
        assert!(matches!(err, TriageError::Schema(_)));
    }

    #[test]
    fn test_validate_is_as_strict_as_the_schema() {
        let mut numeric_id = answer("8", "Cardiología", "alta");
        numeric_id["especialidadId"] = json!(8);
        let err = validate(&numeric_id, &catalog()).unwrap_err();
        assert_eq!(
            err,
            TriageError::Schema("field 'especialidadId' must be a string".to_string())
        );

        for urgency in ["ALTA", " alta ", "Media"] {
            let err = validate(&answer("8", "Cardiología", urgency), &catalog()).unwrap_err();
            assert!(matches!(err, TriageError::Schema(_)), "{urgency} accepted");
        }
    }

    #[test]
    fn test_symptoms_from_body() {
        assert_eq!(
            symptoms_from_body(&json!({"symptoms": "  tos seca  "})).unwrap(),
            "tos seca"
        );
        assert_eq!(
            symptoms_from_body(&json!({"symptoms": "   "})),
            Err(TriageError::EmptySymptoms)
        );
        assert_eq!(
            symptoms_from_body(&json!({"symptoms": 42})),
            Err(TriageError::EmptySymptoms)
        );
    }

    #[test]
    fn test_urgency_serialization() {
        assert_eq!(serde_json::to_value(Urgency::Media).unwrap(), json!("media"));
        assert_eq!(Urgency::Alta.label(), "Urgencia Alta - Busca atención inmediata");
    }
}
