use serde_json::json;

use super::Directory;

pub(super) fn dataset() -> Directory {
    let value = json!({
        "specialties": [
            {"especialidadId": "8", "nombre": "Cardiología", "descripcion": "Enfermedades del corazón y del sistema circulatorio"},
            {"especialidadId": "12", "nombre": "Dermatología"},
            {"especialidadId": "29", "nombre": "Medicina Interna"},
            {"especialidadId": "38", "nombre": "Pediatría"},
            {"especialidadId": "44", "nombre": "Neurología"},
            {"especialidadId": "56", "nombre": "Medicina General Integral"}
        ],
        "subspecialties": [
            {"subEspecialidadId": "CARD-INT", "especialidadId": "8", "nombre": "Cardiología Intervencionista"},
            {"subEspecialidadId": "NEURO-PED", "especialidadId": "44", "nombre": "Neurología Pediátrica"}
        ],
        "insurers": [
            {"seguroId": "RIMAC", "nombre": "RIMAC Seguros"},
            {"seguroId": "PACIFICO", "nombre": "Pacífico Seguros"},
            {"seguroId": "MAPFRE", "nombre": "Mapfre"}
        ],
        "clinics": [
            {
                "clinicaId": "CLIN-001",
                "nombreClinica": "Clínica Internacional Miraflores",
                "ubicacion": "Av. José Pardo 601, Miraflores",
                "ubigeoId": "150122",
                "especialidadIds": ["8", "29", "44"],
                "seguroIds": ["RIMAC", "PACIFICO"],
                "grupoClinicaId": "GRP-01",
                "url": "https://internacional.example/"
            },
            {
                "clinicaId": "CLIN-002",
                "nombreClinica": "Clínica San Felipe",
                "direccion": "Av. Gregorio Escobedo 650, Jesús María",
                "ubigeoId": "150113",
                "especialidadIds": ["8", "38", "44"],
                "seguroIds": ["RIMAC", "MAPFRE"],
                "urlLandingPage": "https://sanfelipe.example/"
            },
            {
                "clinicaId": "CLIN-003",
                "nombreClinica": "Clínica Good Hope",
                "ubicacion": "Malecón Balta 956, Miraflores",
                "ubigeoId": "150122",
                "especialidadIds": ["8", "12", "56"],
                "seguroIds": ["PACIFICO"]
            },
            {
                "clinicaId": "CLIN-004",
                "nombreClinica": "Jockey Salud",
                "ubicacion": "Av. Javier Prado Este 4200, Santiago de Surco",
                "ubigeoId": "150140",
                "especialidadIds": ["29", "44", "56"],
                "seguroIds": ["RIMAC", "PACIFICO", "MAPFRE"]
            }
        ],
        "doctors": [
            {
                "doctorId": "DOC-001",
                "nombreCompleto": "Dr. Juan Pérez",
                "especialidadPrincipalId": "8",
                "subEspecialidadIds": ["CARD-INT"],
                "clinicaId": "CLIN-001",
                "photoUrl": "https://images.example/doc1.png",
                "rimacEnsured": true
            },
            {
                "doctorId": "DOC-002",
                "nombreCompleto": "Dra. María López",
                "especialidadPrincipalId": "8",
                "clinicaIds": ["CLIN-003"],
                "rimacEnsured": false
            },
            {
                "doctorId": "DOC-003",
                "nombres": "Carlos",
                "apellidoPaterno": "Ramírez",
                "apellidoMaterno": "Soto",
                "especialidadId": "12",
                "clinicaIds": ["CLIN-003"]
            },
            {
                "doctorId": "DOC-004",
                "nombreCompleto": "Dra. Lucía Fernández",
                "especialidadPrincipalId": "44",
                "subEspecialidadIds": ["NEURO-PED"],
                "clinicaIds": ["CLIN-002", "CLIN-004"],
                "rimacEnsured": true
            },
            {
                "doctorId": "DOC-005",
                "nombreCompleto": "Dr. Miguel Torres",
                "especialidadPrincipalId": "56",
                "clinicaId": "CLIN-004"
            },
            {
                "doctorId": "DOC-006",
                "nombreCompleto": "Dra. Rosa Huamán",
                "especialidadPrincipalId": "38",
                "clinicaId": "CLIN-002",
                "fotoUrl": "https://images.example/doc6.png"
            }
        ]
    });

    // ubigeos fall back to the full Lima/Callao list
    serde_json::from_value(value).expect("built-in dataset is valid")
}
