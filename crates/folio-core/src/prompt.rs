use crate::site::SiteContent;

const RULES: &[&str] = &[
    "Keep answers concise (1 or 2 sentences unless asked for detail).",
    "Be enthusiastic about AI and Machine Learning.",
    "If asked about a specific project not listed here, say you don't have details on that but suggest checking the GitHub.",
    "Do not make up facts.",
];

/// Social links named in the contact block, in order.
const CONTACT_LINKS: &[&str] = &["github", "linkedin"];

/// Build the assistant's system prompt from site content.
///
/// Sections, in order: persona preamble, bio, skills, featured projects,
/// contact block, rules. Rebuilt on every chat request.
pub fn build_system_prompt(site: &SiteContent) -> String {
    let name = &site.profile.name;
    let first_name = first_name(name);

    let skills = site
        .skill_categories
        .iter()
        .map(|cat| format!("{}: {}", cat.title, cat.skills.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    let projects = site
        .featured_projects()
        .map(|p| {
            format!(
                "- {}: {} (Tech: {})",
                p.title,
                p.impact_statement,
                p.tech_stack.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut contact = Vec::new();
    if let Some(email) = &site.profile.email {
        contact.push(format!("Email: {email}"));
    }
    for link in CONTACT_LINKS.iter().filter_map(|id| site.social_link(id)) {
        contact.push(format!("{}: {}", link.label, link.url));
    }

    let rules = RULES
        .iter()
        .map(|r| format!("- {r}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an AI Portfolio Assistant for {name}.\n\
         \n\
         Your goal is to answer questions about {first_name}'s background, skills, and projects \
         in a professional but friendly tone. Do not simply repeat the project details word for \
         word; make the answer concise and to the point. If the question is not about \
         {first_name}, their background, skills, or projects, answer with a generic response.\n\
         \n\
         Here is the context about {first_name}:\n\
         \n\
         BIO:\n{bio}\n\
         \n\
         SKILLS:\n{skills}\n\
         \n\
         FEATURED PROJECTS:\n{projects}\n\
         \n\
         CONTACT:\n{contact}\n\
         \n\
         RULES:\n{rules}\n",
        bio = site.bio.join(" "),
        contact = contact.join("\n"),
    )
}

/// Greeting the chat widget seeds an empty conversation with.
pub fn greeting(site: &SiteContent) -> String {
    format!(
        "Hi! I'm {}'s AI Assistant. Ask me anything about their projects or experience!",
        first_name(&site.profile.name)
    )
}

fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}
