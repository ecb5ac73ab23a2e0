/* 📖 # Why is the CLI minimal and hand-parsed?

The CLI exposes the path processor one operation at a time, which is handy for
checking how a path behaves on another platform without leaving the shell:

```text
xplat --platform windows clean 'c:/a/../b'     # c:\b
xplat rel /a/b /a/b/c/d                         # c/d
xplat --config host.toml abs bin                 # simulated host from TOML
```

There are only a handful of commands and two flags, so no argument parsing
crate is pulled in. `--platform` naming a platform other than the one the binary
runs on resolves `abs` against that platform's mock working directory
(`/working` or `c:\working`).

Exit codes:
- 0: Success
- 1: Error (unknown command, wrong arity, or the operation failed)
*/

use std::env;
use std::process;

use tracing::debug;
use xplat_base::pal::{Host, MockOs, OsHandle, RealFs};
use xplat_base::tracing::init_tracing;
use xplat_base::{Platform, Processor, XplatResult, err, load_config};

const USAGE: &str = "usage: xplat [--platform <name>] [--config <file>] <command> <path>...

commands:
  clean <path>           lexically normalize a path
  join <path>...         join and clean paths
  rel <base> <target>    path of target relative to base
  abs <path>             absolute path against the working directory
  dir <path>             everything but the last element
  base <path>            the last element
  ext <path>             extension of the last element
  root <path>            volume and root of a path
  volume <path>          volume name of a path
  list <list>            split a path list";

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Error: Failed to initialize tracing: {}", e);
        process::exit(1);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Real OS for the native platform, the mock preset for any other.
fn processor_for(platform: Platform) -> Processor {
    if platform == Platform::current() {
        Processor::new(platform)
    } else {
        Processor::from_os(OsHandle::new(MockOs::for_platform(platform)))
    }
}

fn run(args: &[String]) -> XplatResult<Vec<String>> {
    let mut platform: Option<Platform> = None;
    let mut config: Option<String> = None;
    let mut rest = args;
    loop {
        match rest {
            [flag, value, tail @ ..] if flag == "--platform" => {
                platform = Some(value.parse()?);
                rest = tail;
            }
            [flag, value, tail @ ..] if flag == "--config" => {
                config = Some(value.clone());
                rest = tail;
            }
            _ => break,
        }
    }

    let processor = match (config, platform) {
        (Some(name), _) => {
            let config = load_config(&RealFs::new(), &name)?;
            Host::from_config(&config).path
        }
        (None, Some(platform)) => processor_for(platform),
        (None, None) => Host::new().path,
    };
    debug!(platform = %processor.platform(), "processor ready");

    let Some((command, paths)) = rest.split_first() else {
        return Err(err!("{}", USAGE));
    };
    let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
    let single = |op: fn(&Processor, &str) -> XplatResult<String>| -> XplatResult<Vec<String>> {
        match paths.as_slice() {
            [path] => Ok(vec![op(&processor, path)?]),
            _ => Err(err!("'{}' takes exactly one path\n\n{}", command, USAGE)),
        }
    };

    match command.as_str() {
        "clean" => single(Processor::clean),
        "abs" => single(Processor::abs),
        "dir" => single(Processor::dir),
        "base" => single(Processor::base),
        "ext" => single(Processor::ext),
        "root" => single(Processor::root),
        "volume" => single(Processor::volume_name),
        "join" => Ok(vec![processor.join(&paths)?]),
        "rel" => match paths.as_slice() {
            [base, target] => Ok(vec![processor.rel(base, target)?]),
            _ => Err(err!("'rel' takes a base and a target\n\n{}", USAGE)),
        },
        "list" => match paths.as_slice() {
            [list] => processor.split_list(list),
            _ => Err(err!("'list' takes exactly one path list\n\n{}", USAGE)),
        },
        other => Err(err!("unknown command '{}'\n\n{}", other, USAGE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> XplatResult<Vec<String>> {
        run(&args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_foreign_platform_abs_uses_preset() {
        let foreign = if Platform::current().is_windows() {
            ("linux", "/working/x")
        } else {
            ("windows", r"c:\working\x")
        };
        assert_eq!(
            run_args(&["--platform", foreign.0, "abs", "x"]).unwrap(),
            vec![foreign.1]
        );
    }

    #[test]
    fn test_native_platform_abs_uses_real_directory() {
        let native = Platform::current().to_string();
        let cwd = env::current_dir().unwrap();
        let expected = Processor::new(Platform::current())
            .join(&[cwd.to_str().unwrap(), "x"])
            .unwrap();
        assert_eq!(
            run_args(&["--platform", &native, "abs", "x"]).unwrap(),
            vec![expected]
        );
    }

    #[test]
    fn test_commands() {
        assert_eq!(
            run_args(&["--platform", "linux", "rel", "/a/b", "/a/b/c/d"]).unwrap(),
            vec!["c/d"]
        );
        assert_eq!(
            run_args(&["--platform", "windows", "clean", "c:/a/../b"]).unwrap(),
            vec![r"c:\b"]
        );
        assert!(run_args(&["--platform", "linux", "frobnicate", "x"]).is_err());
        assert!(run_args(&["--platform", "linux", "clean"]).is_err());
    }
}
