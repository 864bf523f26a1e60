//! REPL usage text

/// Help shown by the `help` command
pub const USAGE: &str = concat!(
    "Usage: <command> [<args>, ...]

Commands for project action:
    all [--slot]
        Remove all object files in the project's ./bin directory and compile
        all source files again. Attempt to connect the V5 Brain and upload the
        binary files.
    b
        Compile source files normally in the current PROS project without
        uploading.
    backup
        Commit and push all changes in the repository to the remote server.
    init [--kernel <VERSION>] [--no-pull] [--force]
        Initialize the Git repository and create the PROS project. Apply the
        kernel to the project without overwriting any existing files.
    link [PROJECT_SLUG]
        Link the current directory to a remote repository on Bitbucket. The
        project slug is the same as the project root directory name by default.
    normal [--slot]
        Compile source files normally in the current PROS project. Attempt to
        connect the V5 Brain and upload the binary files.
    pull
        Pull changes from the remote server to the local repository.

Commands for repository management:
    clone [--directory <PATH>] [--kernel <VERSION>] [--no-pull] <LABEL>
        1. Clone a repository from the server to the local machine.
        2. Initialize the PROS project.
    create [--directory <PATH>] [--kernel <VERSION>] [--no-pull] [--local]
        <LABEL>
        1. Create a repository on the local machine. The label should be all
        caps and contain no spaces.
        2. Fork all contents from the template repository.
        3. Initialize the PROS project.
        4. Upload the repository to the server.
    help
        Display this help message.
    secret [<KEY> <VALUE>]
        List all secret keys and values or set a secret key and value.

Options:
    -d,  --directory <PATH>     The workspace directory. The parent directory
                                of where all repositories located at.
                                [default: DEFAULT SETTING]
    -f,  --force                Force the action to run.
    -k,  --kernel <VERSION>     The kernel version to use. [default: latest]
    -l,  --local                Do not create a repository on the server.
    -np, --no-pull              Do not pull template changes/kernel online.
    -s,  --slot <SLOT>          Upload the binary to a specified program slot
                                in the brain. [default: 1, range: 1-8]

Version: ",
    env!("CARGO_PKG_VERSION")
);
