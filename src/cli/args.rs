use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "empdash",
    version,
    about = "employee directory dashboard",
    long_about = "empdash browses a paginated employee directory with server-side filters, local search and sorting.\n\nExamples:\n  empdash\n  empdash --department Engineering --status Active --apply\n  empdash --link '/?legalEntity=Acme&salaryMin=0&salaryMax=10000' -o employees.html\n  empdash -i\n\nTip: Use --config to persist endpoints and view settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output and the loading spinner."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Also write the rendered view to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json, csv, html)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'u',
        long = "lnk",
        visible_aliases = ["link", "url"],
        value_name = "URL",
        help_heading = "Input",
        help = "Deep link to open, e.g. '/?department=Sales&page=2'."
    )]
    pub link: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.empdash/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file (if missing) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'i',
        long = "it",
        visible_alias = "interactive",
        help_heading = "Input",
        help = "Start an interactive shell instead of rendering once."
    )]
    pub interactive: bool,

    #[arg(
        short = 'E',
        long = "le",
        visible_alias = "legal-entity",
        value_name = "NAME",
        help_heading = "Filters",
        help = "Legal entity (clears the sub-entity when it changes)."
    )]
    pub legal_entity: Option<String>,

    #[arg(
        long = "se",
        visible_alias = "sub-entity",
        value_name = "NAME",
        help_heading = "Filters",
        help = "Sub-entity within the selected legal entity."
    )]
    pub sub_entity: Option<String>,

    #[arg(
        short = 'D',
        long = "dep",
        visible_alias = "department",
        value_name = "LIST",
        help_heading = "Filters",
        help = "Departments (comma-separated)."
    )]
    pub department: Option<String>,

    #[arg(
        long = "des",
        visible_alias = "designation",
        value_name = "LIST",
        help_heading = "Filters",
        help = "Designations (comma-separated)."
    )]
    pub designation: Option<String>,

    #[arg(
        long = "st",
        visible_alias = "status",
        value_name = "LIST",
        help_heading = "Filters",
        help = "Employment status (Active, Inactive; comma-separated)."
    )]
    pub status: Option<String>,

    #[arg(
        short = 'k',
        long = "sk",
        visible_alias = "skills",
        value_name = "LIST",
        help_heading = "Filters",
        help = "Skills (comma-separated)."
    )]
    pub skills: Option<String>,

    #[arg(
        long = "sr",
        visible_alias = "salary-range",
        value_name = "LIST",
        help_heading = "Filters",
        help = "Salary buckets (e.g. 0-10000,50000-100000)."
    )]
    pub salary_range: Option<String>,

    #[arg(
        short = 'a',
        long = "apl",
        visible_alias = "apply",
        help_heading = "View",
        help = "Apply the edited filters (fetches the first page with them)."
    )]
    pub apply: bool,

    #[arg(
        short = 'r',
        long = "rst",
        visible_alias = "reset",
        help_heading = "View",
        help = "Reset all filters before any other edits."
    )]
    pub reset: bool,

    #[arg(
        short = 's',
        long = "sch",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "View",
        help = "Filter the current page by name (case-insensitive)."
    )]
    pub search: Option<String>,

    #[arg(
        long = "srt",
        visible_alias = "sort",
        value_name = "KEY",
        help_heading = "View",
        help = "Sort key (name-asc, name-desc, salary-asc, salary-desc, joiningDate-asc, joiningDate-desc)."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "View",
        help = "Page to show (1-based)."
    )]
    pub page: Option<u32>,

    #[arg(
        short = 'P',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "View",
        help = "Rows per page (default 10)."
    )]
    pub page_size: Option<u32>,

    #[arg(
        long = "ee",
        visible_alias = "employees-endpoint",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Employees API endpoint."
    )]
    pub employees_endpoint: Option<String>,

    #[arg(
        long = "fe",
        visible_alias = "filters-endpoint",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Filter catalog API endpoint."
    )]
    pub filters_endpoint: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,
}
