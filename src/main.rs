use clap::{arg,crate_version,Command};
use hscompress::{Algorithm,Options};
use std::str::FromStr;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            return true;
        }
        return false;
    }
    true
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `hscompress compress -m hs -d 4 -l 8 -i my_file -o my_file.hs`
Expand:        `hscompress expand -i my_file.hs -o my_file`";

    let methods = ["lzss","huffman","hs"];

    let mut main_cmd = Command::new("hscompress")
        .about("Compress and expand with LZSS, Huffman, or both")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-m --method <METHOD> "compression algorithm").value_parser(methods)
            .required(true))
        .arg(arg!(-d --dictionary <KB> "dictionary size in KB (lzss and hs)")
            .value_parser(clap::value_parser!(usize)).default_value("1"))
        .arg(arg!(-l --lookahead <KB> "lookahead buffer size in KB (lzss and hs)")
            .value_parser(clap::value_parser!(usize)).default_value("8"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-m --method <METHOD> "compression algorithm, detected if omitted").value_parser(methods)
            .required(false))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let method = Algorithm::from_str(cmd.get_one::<String>("method").expect(RCH))?;
        let dict_kb = cmd.get_one::<usize>("dictionary").expect(RCH);
        let look_kb = cmd.get_one::<usize>("lookahead").expect(RCH);
        let opt = Options::create(dict_kb.saturating_mul(1024),look_kb.saturating_mul(1024));
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let ibuf = std::fs::read(path_in)?;
        log::info!("compressing {} with {}",path_in,method);
        let obuf = method.compress(&ibuf,&opt)?;
        std::fs::write(path_out,&obuf)?;
        eprintln!("compressed {} into {}",ibuf.len(),obuf.len());
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let ibuf = std::fs::read(path_in)?;
        let method = match cmd.get_one::<String>("method") {
            Some(m) => Algorithm::from_str(m)?,
            None => match Algorithm::detect(&ibuf) {
                Some(m) => m,
                None => {
                    eprintln!("could not identify the format of {}",path_in);
                    return Err(Box::new(hscompress::Error::CorruptHeader));
                }
            }
        };
        log::info!("expanding {} with {}",path_in,method);
        let obuf = method.expand(&ibuf)?;
        std::fs::write(path_out,&obuf)?;
        eprintln!("expanded {} into {}",ibuf.len(),obuf.len());
    }

    Ok(())
}
