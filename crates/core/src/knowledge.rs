use crate::models::{
    KnowledgeBase, KnowledgeStats, LegalProcedure, LegalSection, ProcedureBook, ProcedureEntry,
    SectionTables, CRPC_CODE, IPC_CODE,
};

impl KnowledgeBase {
    pub fn new(sections: SectionTables, procedures: ProcedureBook) -> Self {
        Self {
            sections,
            procedures,
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            SectionTables {
                ipc: builtin_ipc_sections(),
                crpc: builtin_crpc_sections(),
            },
            builtin_procedures(),
        )
    }

    /// Case-insensitive on both code and number.
    pub fn find_section(&self, code: &str, number: &str) -> Option<&LegalSection> {
        let table = if code.eq_ignore_ascii_case(IPC_CODE) {
            &self.sections.ipc
        } else if code.eq_ignore_ascii_case(CRPC_CODE) {
            &self.sections.crpc
        } else {
            return None;
        };

        table
            .iter()
            .find(|section| section.number.eq_ignore_ascii_case(number.trim()))
    }

    pub fn procedure(&self, slug: &str) -> Option<&LegalProcedure> {
        self.procedures.get(slug)
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats {
            ipc_sections: self.sections.ipc.len(),
            crpc_sections: self.sections.crpc.len(),
            procedures: self.procedures.len(),
        }
    }
}

pub fn builtin_ipc_sections() -> Vec<LegalSection> {
    vec![
        section(
            IPC_CODE,
            "302",
            "Punishment for murder",
            "Whoever commits murder shall be punished with death, or imprisonment for life, and shall also be liable to fine.",
            Some("Death or imprisonment for life, and fine"),
        ),
        section(
            IPC_CODE,
            "376",
            "Punishment for rape",
            "Whoever commits rape shall be punished with rigorous imprisonment for a term not less than ten years, but which may extend to imprisonment for life, and shall also be liable to fine.",
            Some("Rigorous imprisonment for 10 years to life, and fine"),
        ),
        section(
            IPC_CODE,
            "420",
            "Cheating and dishonestly inducing delivery of property",
            "Whoever cheats and thereby dishonestly induces the person deceived to deliver any property to any person, or to make, alter or destroy the whole or any part of a valuable security, or anything which is signed or sealed, and which is capable of being converted into a valuable security, shall be punished with imprisonment.",
            Some("Imprisonment up to 7 years, and fine"),
        ),
        section(
            IPC_CODE,
            "304B",
            "Dowry death",
            "Where the death of a woman is caused by any burns or bodily injury or occurs otherwise than under normal circumstances within seven years of her marriage and it is shown that soon before her death she was subjected to cruelty or harassment by her husband or any relative of her husband for, or in connection with, any demand for dowry, such death shall be called 'dowry death'.",
            Some("Imprisonment for not less than 7 years but which may extend to imprisonment for life"),
        ),
        section(
            IPC_CODE,
            "498A",
            "Husband or relative of husband of a woman subjecting her to cruelty",
            "Whoever, being the husband or the relative of the husband of a woman, subjects such woman to cruelty shall be punished with imprisonment.",
            Some("Imprisonment up to 3 years and fine"),
        ),
    ]
}

pub fn builtin_crpc_sections() -> Vec<LegalSection> {
    vec![
        section(
            CRPC_CODE,
            "154",
            "Information in cognizable cases",
            "Every information relating to the commission of a cognizable offence, if given orally to an officer in charge of a police station, shall be reduced to writing by him or under his direction.",
            None,
        ),
        section(
            CRPC_CODE,
            "156",
            "Police officer's power to investigate cognizable case",
            "Any officer in charge of a police station may, without the order of a Magistrate, investigate any cognizable case which a Court having jurisdiction over the local area within the limits of such station would have power to inquire into or try under the provisions of Chapter XIII.",
            None,
        ),
        section(
            CRPC_CODE,
            "164",
            "Recording of confessions and statements",
            "Any Metropolitan Magistrate or Judicial Magistrate may, whether or not he has jurisdiction in the case, record any confession or statement made to him in the course of an investigation or at any time afterwards before the commencement of the inquiry or trial.",
            None,
        ),
        section(
            CRPC_CODE,
            "41",
            "When police may arrest without warrant",
            "Any police officer may without an order from a Magistrate and without a warrant, arrest any person who has committed a cognizable offence, or against whom a reasonable complaint has been made, or credible information has been received, or a reasonable suspicion exists, of his having been concerned in a cognizable offence.",
            None,
        ),
    ]
}

pub fn builtin_procedures() -> ProcedureBook {
    ProcedureBook::new(vec![
        procedure(
            "file_fir",
            "Filing an FIR (First Information Report)",
            &[
                "Visit the police station in whose jurisdiction the offense occurred",
                "Provide a written or oral complaint detailing the incident",
                "Police officer must register the FIR if the offense is cognizable",
                "Get a free copy of the FIR",
                "If police refuse to register an FIR for a cognizable offense, approach the Superintendent of Police or file a complaint with the Magistrate under Section 156(3) CrPC",
            ],
        ),
        procedure(
            "bail_process",
            "Bail Process",
            &[
                "File bail application in the appropriate court",
                "For bailable offenses, bail is a matter of right",
                "For non-bailable offenses, it's at the court's discretion",
                "Factors considered: severity of crime, flight risk, evidence tampering possibility",
                "Bail can be regular (by court) or anticipatory (before arrest)",
            ],
        ),
        procedure(
            "domestic_violence",
            "Domestic Violence Complaint",
            &[
                "File complaint under Protection of Women from Domestic Violence Act, 2005",
                "Approach Protection Officer, police, or Magistrate directly",
                "Get protection orders, residence orders, monetary relief",
                "Free legal aid is available for victims",
                "Cases are heard by Magistrate courts",
            ],
        ),
    ])
}

fn section(
    code: &str,
    number: &str,
    title: &str,
    description: &str,
    punishment: Option<&str>,
) -> LegalSection {
    LegalSection {
        code: code.to_string(),
        number: number.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        punishment: punishment.map(ToString::to_string),
    }
}

fn procedure(slug: &str, title: &str, steps: &[&str]) -> ProcedureEntry {
    ProcedureEntry {
        slug: slug.to_string(),
        procedure: LegalProcedure {
            title: title.to_string(),
            steps: steps.iter().map(ToString::to_string).collect(),
        },
    }
}
