use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    loadstone completions bash > ~/.bash_completion.d/loadstone\n\n\
                  Generate zsh completions:\n    loadstone completions zsh > ~/.zfunc/_loadstone\n\n\
                  Generate fish completions:\n    loadstone completions fish > ~/.config/fish/completions/loadstone.fish\n\n\
                  Generate PowerShell completions:\n    loadstone completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
