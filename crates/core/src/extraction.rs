//! Free-text query extraction: "cardiólogo en Miraflores" to filters

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use crate::districts::{self, District};
use crate::error::CoreError;
use crate::text::{match_key, non_empty};
use crate::triage::SpecialtyOption;

pub const SEARCH_PROMPT: &str = r#"Eres un asistente de búsqueda médica que extrae información estructurada de consultas de usuarios en español.

Tu tarea es extraer la especialidad médica y la ubicación (distrito de Lima Metropolitana o Callao) mencionadas en la consulta.

Responde SIEMPRE en español y con un tono conciso y útil.

Requisitos para extraer la información:
- La especialidad médica debe ser una especialidad médica válida y debe estar bien escrita. EJ. "Cardiología", "Pediatría", "Neurología", etc.
- La ubicación debe ser un distrito de Lima Metropolitana o Callao y debe estar bien escrita. EJ. "Lima", "Lince", "Miraflores", "San Isidro", etc.
- El texto debe ser una respuesta al usuario con la información encontrada.

INDICACIONES PARA RESPONDER AL USUARIO:
- No uses emojis.
- Utiliza un tono amable y profesional.
- No uses comillas dobles en el texto de respuesta.

Devuelve la información en el siguiente formato JSON:
{
  "especialidad": "string",
  "distrito": "string",
  "texto": "string"
}

Si la información no se menciona explícitamente, infiere según el contexto o deja el campo vacío."#;

/// JSON schema for the extraction tool call
pub fn extraction_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "especialidad": {
                "type": ["string", "null"],
                "description": "La especialidad médica extraída de la consulta"
            },
            "distrito": {
                "type": ["string", "null"],
                "description": "El distrito de Lima Metropolitana o Callao extraído de la consulta"
            },
            "texto": {
                "type": "string",
                "description": "El texto de respuesta al usuario con la información encontrada"
            }
        },
        "required": ["texto"],
        "additionalProperties": false
    })
}

/// Pull the user's query out of whatever body the client posted.
///
/// Clients send either a bare JSON string or an object carrying `query`
/// or `prompt`; anything else is forwarded as its JSON text.
pub fn query_from_body(body: &JsonValue) -> Option<String> {
    let text = match body {
        JsonValue::String(s) => s.clone(),
        JsonValue::Object(obj) => match ["query", "prompt"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(JsonValue::as_str))
        {
            Some(s) => s.to_string(),
            None => body.to_string(),
        },
        JsonValue::Null => return None,
        other => other.to_string(),
    };
    non_empty(Some(text.as_str())).map(str::to_string)
}

/// Structured view of a free-text query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchExtraction {
    pub especialidad: Option<String>,
    pub distrito: Option<String>,
    pub texto: String,
}

impl SearchExtraction {
    /// Validate a raw model answer; blank fields become `None`
    pub fn from_value(raw: &JsonValue) -> Result<Self, CoreError> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            especialidad: Option<String>,
            #[serde(default)]
            distrito: Option<String>,
            texto: String,
        }

        let raw: Raw = serde_json::from_value(raw.clone())
            .map_err(|e| CoreError::Schema(e.to_string()))?;
        let texto = raw.texto.trim().to_string();
        if texto.is_empty() {
            return Err(CoreError::Schema("field 'texto' is empty".to_string()));
        }
        Ok(Self {
            especialidad: non_empty(raw.especialidad.as_deref()).map(str::to_string),
            distrito: non_empty(raw.distrito.as_deref()).map(str::to_string),
            texto,
        })
    }

    pub fn district(&self) -> Option<&'static District> {
        self.distrito.as_deref().and_then(districts::find_by_name)
    }

    pub fn specialty<'a>(&self, options: &'a [SpecialtyOption]) -> Option<&'a SpecialtyOption> {
        let key = match_key(self.especialidad.as_deref()?);
        options.iter().find(|o| match_key(&o.nombre) == key)
    }

    /// Attach the catalog ids the extracted names resolve to
    pub fn resolve(self, options: &[SpecialtyOption]) -> ResolvedSearch {
        let ubigeo_id = self.district().map(|d| d.code.to_string());
        let especialidad_id = self.specialty(options).map(|o| o.id.clone());
        ResolvedSearch {
            extraction: self,
            ubigeo_id,
            especialidad_id,
        }
    }
}

/// Extraction plus the ids usable as search filters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSearch {
    #[serde(flatten)]
    pub extraction: SearchExtraction,
    pub ubigeo_id: Option<String>,
    pub especialidad_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_body_shapes() {
        assert_eq!(
            query_from_body(&json!("cardiólogo en Lince")).as_deref(),
            Some("cardiólogo en Lince")
        );
        assert_eq!(
            query_from_body(&json!({"prompt": "pediatra"})).as_deref(),
            Some("pediatra")
        );
        assert_eq!(query_from_body(&json!("   ")), None);
        assert_eq!(query_from_body(&JsonValue::Null), None);
    }

    #[test]
    fn test_from_value_normalizes_blanks() {
        let ext = SearchExtraction::from_value(&json!({
            "especialidad": "Cardiología",
            "distrito": "",
            "texto": "Buscaré cardiólogos para ti."
        }))
        .unwrap();
        assert_eq!(ext.especialidad.as_deref(), Some("Cardiología"));
        assert_eq!(ext.distrito, None);
    }

    #[test]
    fn test_from_value_requires_texto() {
        let err = SearchExtraction::from_value(&json!({"especialidad": null})).unwrap_err();
        assert!(matches!(err, CoreError::Schema(_)));
    }

    #[test]
    fn test_resolve_ids() {
        let options = vec![SpecialtyOption {
            id: "8".to_string(),
            nombre: "Cardiología".to_string(),
            descripcion: None,
        }];
        let resolved = SearchExtraction {
            especialidad: Some("cardiologia".to_string()),
            distrito: Some("San Isidro".to_string()),
            texto: "ok".to_string(),
        }
        .resolve(&options);

        assert_eq!(resolved.ubigeo_id.as_deref(), Some("150131"));
        assert_eq!(resolved.especialidad_id.as_deref(), Some("8"));

        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["distrito"], "San Isidro");
        assert_eq!(value["ubigeoId"], "150131");
    }
}
