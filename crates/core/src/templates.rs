use crate::models::{LegalProcedure, LegalSection, ScenarioFamily};

pub const GREETING: &str = "नमस्ते! मैं विधि साथी हूँ, आपका कानूनी सहायक। आप मुझसे भारतीय दंड संहिता (IPC) और आपराधिक प्रक्रिया संहिता (CrPC) के बारे में पूछ सकते हैं। / Hello! I am VidhiSaarthi, your legal assistant. You can ask me about Indian Penal Code (IPC), Criminal Procedure Code (CrPC), and other Indian legal matters.";

pub const PUNISHMENT_DISCLAIMER: &str = "Please note that the exact punishment is determined by the court based on evidence and circumstances. It is advised to consult a legal expert for a case-specific opinion.";

pub const APPLICATION_DISCLAIMER: &str = "Please note that the exact application is determined by the court based on evidence and circumstances. It is advised to consult a legal expert for a case-specific opinion.";

pub const GUIDELINES_DISCLAIMER: &str = "Please note that these are general guidelines. For specific legal advice, please consult a qualified legal professional.";

pub const STANDING_DISCLAIMER: &str = "Disclaimer: My responses are for informational purposes only and not a substitute for professional legal advice.";

/// Opens the closing note of every scenario analysis.
pub const SCENARIO_NOTE: &str = "The exact punishment is determined by the court based on evidence and circumstances. It is advised to consult a legal expert for a case-specific opinion.";

const UNSPECIFIED_PUNISHMENT: &str = "Not specified in the knowledge base.";

const FIR_FILING_TITLE: &str = "Filing an FIR (First Information Report)";

const FIR_FILING_STEPS: [&str; 5] = [
    "Visit the police station in whose jurisdiction the offense occurred",
    "Provide a written or oral complaint detailing the incident",
    "Police officer must register the FIR if the offense is cognizable",
    "Get a free copy of the FIR",
    "If police refuse to register an FIR for a cognizable offense, approach the Superintendent of Police or file a complaint with the Magistrate under Section 156(3) CrPC",
];

pub fn ipc_section(section: &LegalSection) -> String {
    format!(
        "IPC Section {}: {}\n\nDescription: {}\n\nPunishment: {}\n\n{}",
        section.number,
        section.title,
        section.description,
        section
            .punishment
            .as_deref()
            .unwrap_or(UNSPECIFIED_PUNISHMENT),
        PUNISHMENT_DISCLAIMER
    )
}

pub fn crpc_section(section: &LegalSection) -> String {
    format!(
        "CrPC Section {}: {}\n\nDescription: {}\n\n{}",
        section.number, section.title, section.description, APPLICATION_DISCLAIMER
    )
}

pub fn procedure(procedure: &LegalProcedure) -> String {
    numbered_steps(&procedure.title, procedure.steps.iter().map(String::as_str))
}

pub fn fir_filing() -> String {
    numbered_steps(FIR_FILING_TITLE, FIR_FILING_STEPS.iter().copied())
}

pub fn fallback() -> String {
    format!(
        "I understand you're asking about a legal matter. To provide accurate information, I need specific details about:\n\n\
1. The exact situation or incident you're inquiring about\n\
2. Whether you're asking from the perspective of a victim, accused, or witness\n\
3. Any specific legal sections or procedures you want to know about\n\n\
As a legal assistant, I can help with information on Indian Penal Code (IPC), Criminal Procedure Code (CrPC), and civil matters. Please provide more details so I can assist you properly.\n\n{}",
        STANDING_DISCLAIMER
    )
}

fn numbered_steps<'a>(title: &str, steps: impl Iterator<Item = &'a str>) -> String {
    let body = steps
        .enumerate()
        .map(|(idx, step)| format!("{}. {}", idx + 1, step))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}:\n\n{}\n\n{}", title, body, GUIDELINES_DISCLAIMER)
}

struct ScenarioAnalysis {
    topic: &'static str,
    offenses: &'static [&'static str],
    factors_heading: &'static str,
    factors: &'static [&'static str],
    actions_heading: &'static str,
    actions: &'static [&'static str],
    closing_note: Option<&'static str>,
}

pub fn scenario_analysis(family: ScenarioFamily) -> String {
    let analysis = analysis_for(family);

    let mut note = SCENARIO_NOTE.to_string();
    if let Some(extra) = analysis.closing_note {
        note.push(' ');
        note.push_str(extra);
    }

    format!(
        "Based on your query about {}, here's my legal analysis:\n\n\
1️⃣ Potential Legal Offenses:\n{}\n\n\
2️⃣ Legal Consequences:\n{}\n{}\n\n\
3️⃣ {}:\n{}\n\n\
4️⃣ Legal Note:\n{}",
        analysis.topic,
        bullets(analysis.offenses),
        analysis.factors_heading,
        bullets(analysis.factors),
        analysis.actions_heading,
        bullets(analysis.actions),
        note
    )
}

fn bullets(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn analysis_for(family: ScenarioFamily) -> ScenarioAnalysis {
    match family {
        ScenarioFamily::Theft => ScenarioAnalysis {
            topic: "theft",
            offenses: &[
                "Simple theft (IPC Section 379): Punishment up to 3 years imprisonment and/or fine",
                "Theft in dwelling house (IPC Section 380): Punishment up to 7 years and fine",
                "Robbery (IPC Section 392): If force was used, punishment up to 10 years and fine",
                "Dacoity (IPC Section 395): If committed by five or more persons, punishment up to life imprisonment",
            ],
            factors_heading: "The exact punishment depends on factors like:",
            factors: &[
                "Value of stolen property",
                "Use of force or weapons",
                "Number of persons involved",
                "Prior criminal history",
            ],
            actions_heading: "Recommended Actions",
            actions: &[
                "File an FIR at the police station with jurisdiction",
                "Provide all evidence including CCTV footage if available",
                "List all stolen items with approximate values",
                "Cooperate with the police investigation",
            ],
            closing_note: None,
        },
        ScenarioFamily::Assault => ScenarioAnalysis {
            topic: "assault/injury",
            offenses: &[
                "Hurt (IPC Section 323): Simple hurt, punishment up to 1 year and/or fine",
                "Grievous hurt (IPC Section 325): Serious injury, punishment up to 7 years and fine",
                "Attempt to murder (IPC Section 307): If intent to kill, punishment up to 10 years",
                "Assault to outrage modesty (IPC Section 354): If gender-based, punishment up to 5 years",
            ],
            factors_heading: "The severity of punishment depends on:",
            factors: &[
                "Nature and extent of injury",
                "Weapon used, if any",
                "Intent behind the assault",
                "Relationship between parties",
            ],
            actions_heading: "Recommended Actions",
            actions: &[
                "Get medical treatment and secure a Medico-Legal Certificate (MLC)",
                "File an FIR with detailed description of the incident",
                "Collect witness statements and any available evidence",
                "Consider applying for victim compensation",
            ],
            closing_note: None,
        },
        ScenarioFamily::Homicide => ScenarioAnalysis {
            topic: "death/homicide",
            offenses: &[
                "Murder (IPC Section 302): Intentional killing, punishment with death or life imprisonment and fine",
                "Culpable homicide not amounting to murder (IPC Section 304): Unintentional killing, punishment up to life imprisonment",
                "Death by negligence (IPC Section 304A): Accidental death, punishment up to 2 years",
                "Dowry death (IPC Section 304B): Death of woman within 7 years of marriage under suspicious circumstances",
            ],
            factors_heading: "The charge and punishment depend on:",
            factors: &[
                "Presence of intention (mens rea)",
                "Circumstances and method of killing",
                "Relationship between parties",
                "Evidence of premeditation",
            ],
            actions_heading: "Recommended Actions",
            actions: &[
                "Report to police immediately",
                "Ensure proper post-mortem examination",
                "Preserve all evidence",
                "Consider engaging a criminal lawyer",
            ],
            closing_note: None,
        },
        ScenarioFamily::SexualOffense => ScenarioAnalysis {
            topic: "sexual offenses",
            offenses: &[
                "Rape (IPC Section 376): Punishment with rigorous imprisonment from 10 years to life and fine",
                "Sexual harassment (IPC Section 354A): Punishment up to 3 years and/or fine",
                "Stalking (IPC Section 354D): Punishment up to 5 years for subsequent offenses",
                "Voyeurism (IPC Section 354C): Punishment from 1 to 7 years depending on repetition",
            ],
            factors_heading: "Sexual offenses are treated severely under Indian law with enhanced punishments for:",
            factors: &[
                "Offenses against minors (POCSO Act)",
                "Repeat offenders",
                "Position of authority or trust",
                "Offenses causing grievous hurt",
            ],
            actions_heading: "Recommended Actions for Victims",
            actions: &[
                "Report to police or women's helpline (1091)",
                "Seek immediate medical examination",
                "Statement can be recorded by female officer",
                "Right to free legal aid",
            ],
            closing_note: Some(
                "All sexual offense cases are handled with confidentiality to protect victim identity.",
            ),
        },
        ScenarioFamily::Fraud => ScenarioAnalysis {
            topic: "fraud/cheating",
            offenses: &[
                "Cheating (IPC Section 420): Punishment up to 7 years and fine",
                "Criminal breach of trust (IPC Section 406): Punishment up to 3 years and/or fine",
                "Forgery (IPC Sections 465, 468): Punishment up to 7 years and fine",
                "Cybercrime (IT Act, 2000): Various penalties depending on the nature of fraud",
            ],
            factors_heading: "The severity of punishment depends on:",
            factors: &[
                "Amount involved in fraud",
                "Method and sophistication",
                "Number of victims affected",
                "Position of trust (if any)",
            ],
            actions_heading: "Recommended Actions",
            actions: &[
                "Preserve all documentation and evidence",
                "File a detailed FIR with the police",
                "For online fraud, also report to cybercrime portal (cybercrime.gov.in)",
                "Consider civil remedies for recovery of money",
            ],
            closing_note: Some(
                "For financial frauds, also consider approaching consumer forums or financial regulators.",
            ),
        },
    }
}
