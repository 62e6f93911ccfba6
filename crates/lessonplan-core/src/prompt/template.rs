//! Prompt construction for lesson-plan generation.
//!
//! The prompt ends with a response-format block listing the four section
//! headers in canonical order; the section extractor depends on the model
//! reproducing exactly those headers.

use std::fmt::Write as _;

use crate::sections::SectionKey;

use super::request::GenerationRequest;

const ROLE: &str = "Você é especialista em pedagogia e em planos de aula criativos, \
alinhados à BNCC (Base Nacional Comum Curricular).";

/// What each section should contain, keyed by canonical order.
fn section_guidance(key: SectionKey) -> &'static str {
    match key {
        SectionKey::Introduction => {
            "Abertura criativa e motivadora que prenda a atenção da turma. Use linguagem \
             acessível, perguntas instigantes, exemplos do cotidiano ou uma situação-problema. \
             Emojis são bem-vindos."
        }
        SectionKey::Objective => {
            "Um único objetivo claro e mensurável, alinhado à BNCC, escrito com verbos da \
             Taxonomia de Bloom (identificar, compreender, analisar, criar...). Diga o que o \
             aluno será capaz de fazer ao final da aula."
        }
        SectionKey::Steps => {
            "Etapas numeradas com tempo estimado para cada uma:\n\
             - Etapa 1: Contextualização\n\
             - Etapa 2: Exploração e desenvolvimento\n\
             - Etapa 3: Atividade prática\n\
             - Etapa 4: Fechamento e avaliação\n\
             Indique materiais, organização da turma, perguntas a fazer e exemplos concretos."
        }
        SectionKey::Rubric => {
            "Critérios de avaliação em quatro níveis:\n\
             - Excelente (9-10 pontos)\n\
             - Bom (7-8 pontos)\n\
             - Satisfatório (5-6 pontos)\n\
             - Precisa melhorar (abaixo de 5 pontos), com uma sugestão de ação pedagógica\n\
             Para cada nível, descreva comportamentos observáveis e habilidades demonstradas."
        }
    }
}

/// Build the full prompt for one request.
///
/// The standards-code and notes lines are only present when the request
/// carries them.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(ROLE);
    prompt.push_str("\n\n**TAREFA:**\n");
    let _ = writeln!(
        prompt,
        "Crie um plano de aula completo e criativo sobre o tema \"{}\" para {}, com duração de {} minutos.",
        request.topic,
        request.grade_level.label(),
        request.duration_minutes,
    );
    if let Some(code) = &request.standards_code {
        let _ = writeln!(prompt, "Habilidade BNCC: {code}");
    }
    if let Some(notes) = &request.notes {
        let _ = writeln!(prompt, "Observações do professor: {notes}");
    }

    prompt.push_str("\n**ESTRUTURA OBRIGATÓRIA (4 PARTES):**\n");
    for (index, key) in SectionKey::ALL.into_iter().enumerate() {
        let _ = write!(
            prompt,
            "\n## {}. {}\n{}\n",
            index + 1,
            key.header(),
            section_guidance(key)
        );
    }

    prompt.push_str(
        "\n**DIRETRIZES:**\n\
         - Adapte a complexidade ao nível de ensino\n\
         - Proponha atividades práticas e interativas\n\
         - Inclua possibilidades de diferenciação pedagógica\n\
         - Separe claramente as 4 partes com os títulos em maiúsculas\n",
    );

    prompt.push_str(
        "\n**FORMATO DE RESPOSTA:**\n\
         Responda EXATAMENTE neste formato, com os títulos em maiúsculas, nesta ordem:\n",
    );
    for key in SectionKey::ALL {
        let _ = write!(prompt, "\n{}\n[seu texto aqui]\n", key.header());
    }

    prompt.trim_end().to_owned()
}
