//! Prompt assembly for course and roadmap generation.
//!
//! Course prompts ask for strict markdown with one `##` heading per lab so
//! the segmenter can split the answer. Roadmap prompts ask for a bare JSON
//! object shaped `{pathTitle, steps: [{title, description}]}`.

use curriculum::DifficultyLevel;

/// Builds generation prompts.
pub struct PromptBuilder;

impl PromptBuilder {
    /// System prompt shared by every generation request.
    pub fn system_prompt() -> String {
        let mut prompt = String::new();
        prompt.push_str("You are the curriculum office of an applied technology institute.\n");
        prompt.push_str("You design rigorous, industry-aligned study material backed by research.\n");
        prompt.push_str("Prefer current, production-grade tooling over legacy stacks.\n");
        prompt
    }

    /// Audience and pedagogy guidance for a difficulty level.
    pub fn level_instructions(level: DifficultyLevel) -> String {
        let (track, audience, market, research, pedagogy, tooling) = match level {
            DifficultyLevel::Beginner => (
                "Bachelor (undergraduate)",
                "entry-level candidates targeting junior developer roles",
                "the must-haves of junior postings: clean syntax, version control, HTTP and REST",
                "foundational papers that established the field",
                "Scaffolding. Define every term, use analogies, end with a portfolio-ready project.",
                "Use current stable releases and the project layouts found in production code.",
            ),
            DifficultyLevel::Intermediate => (
                "Master (graduate)",
                "mid-level engineers aiming for senior roles",
                "system design, scalability and cloud-native requirements",
                "architecture papers behind the tools in use",
                "Applied engineering. Skip syntax; focus on trade-offs, testing and deployment.",
                "Mandate strongly typed code and make unit tests part of every lab.",
            ),
            DifficultyLevel::Advanced => (
                "Ph.D. (research)",
                "staff and principal engineers",
                "deep internals, optimization and novel architecture",
                "state-of-the-art research in the area",
                "Research and synthesis. Explain how things work under the hood.",
                "Cover high-performance and large-scale distributed techniques.",
            ),
        };

        format!(
            "**Academic Level: {}**\n\
             Target audience: {}.\n\
             Job market focus: {}.\n\
             Research base: cite {}.\n\
             Pedagogy: {}\n\
             Tooling: {}\n",
            track, audience, market, research, pedagogy, tooling
        )
    }

    /// Prompt for a lab-centric course syllabus on `topic`.
    pub fn course_prompt(topic: &str, level: DifficultyLevel) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("# COURSE REQUEST: \"{}\"\n\n", topic));

        prompt.push_str("## Research\n\n");
        prompt.push_str(&format!(
            "1. Search current senior job descriptions and engineering blogs about {}.\n",
            topic
        ));
        prompt.push_str(&format!(
            "2. Search seminal research papers and university syllabi for {}.\n\n",
            topic
        ));

        prompt.push_str("## Level\n\n");
        prompt.push_str(&Self::level_instructions(level));

        prompt.push_str("\n## Structure (strict markdown)\n\n");
        prompt.push_str("1. Open with an abstract explaining market demand and the academic basis.\n");
        prompt.push_str("2. Split the course into 4-6 lab assignments, each starting with an H2 heading\n");
        prompt.push_str("   such as `## Lab 101: Environment Provisioning`.\n");
        prompt.push_str("3. In each lab give the theory, an objective, the tools with links to their\n");
        prompt.push_str("   official download pages, step-by-step commands and a readiness checklist.\n");
        prompt.push_str("4. The last lab is a capstone project.\n");

        prompt
    }

    /// Prompt for a multi-phase career roadmap toward `goal`.
    pub fn path_prompt(goal: &str, level: DifficultyLevel) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("# ROADMAP REQUEST: \"{}\"\n\n", goal));
        prompt.push_str(&format!("The student enters at **{}** level.\n\n", level));

        prompt.push_str("## Research\n\n");
        prompt.push_str(&format!(
            "Search current career paths, in-demand skills and key research papers for {}.\n\n",
            goal
        ));

        prompt.push_str("## Phases\n\n");
        prompt.push_str("1. Bachelor phase: foundations and junior requirements (codes BS-100..)\n");
        prompt.push_str("2. Master phase: architecture and scaling (codes MS-500..)\n");
        prompt.push_str("3. Ph.D. phase: specialization and research (codes PHD-800..)\n");
        prompt.push_str("4. Career phase: resumes, interview patterns, system design (codes JOB-900..)\n");

        prompt.push_str("\n## Required Response Format\n\n");
        prompt.push_str("Return only a raw JSON object, without markdown code fences:\n\n");
        prompt.push_str("{\n");
        prompt.push_str("  \"pathTitle\": \"<formal program name>\",\n");
        prompt.push_str("  \"steps\": [\n");
        prompt.push_str("    {\"title\": \"<code>: <course name>\", \"description\": \"<academic summary>\"}\n");
        prompt.push_str("  ]\n");
        prompt.push_str("}\n");

        prompt
    }

    /// Topic used when generating the course behind a roadmap node.
    pub fn node_course_topic(node_title: &str, path_topic: &str) -> String {
        format!("{} (Part of {} degree)", node_title, path_topic)
    }

    /// Estimate token count (4 characters per token).
    pub fn estimate_tokens(prompt: &str) -> usize {
        prompt.len() / 4
    }
}
